//! Settlement store port.
//!
//! Settling is the only multi-record write in the system. Awarding points,
//! clearing the paid-for cart entries and recording history happen in one
//! transactional unit: either all three are visible afterwards or none.
//!
//! A charge the gateway accepted is first recorded as a
//! [`PendingSettlement`]. The record is removed by the settlement that
//! commits it, so a record that is still present means money was taken and
//! the points were not yet awarded.

use crate::domain::cart::CartEntry;
use crate::domain::checkout::{Settlement, TransactionHistory};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::ChargeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the store looked like once a settlement committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub history: TransactionHistory,

    /// The user's loyalty balance after the award.
    pub point_balance: i64,

    /// Entries left in the cart (units added while the charge ran).
    pub remaining: Vec<CartEntry>,
}

/// An accepted charge whose settlement has not committed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSettlement {
    pub settlement: Settlement,
    pub charge: ChargeResult,
    pub recorded_at: Timestamp,
}

impl PendingSettlement {
    pub fn new(settlement: Settlement, charge: ChargeResult) -> Self {
        Self {
            settlement,
            charge,
            recorded_at: Timestamp::now(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.settlement.user_id
    }
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Remember an accepted charge until its settlement commits.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the user already has a different order pending
    /// - `DatabaseError` on storage failure
    async fn record_pending(&self, pending: &PendingSettlement) -> Result<(), DomainError>;

    /// The user's charged-but-unsettled order, if any.
    async fn pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PendingSettlement>, DomainError>;

    /// Apply a settlement atomically.
    ///
    /// Locks the user and their cart, removes the snapshotted units via
    /// `checkout::reconcile`, adds `total_points` to the balance, inserts
    /// the history row and drops the pending record for the order.
    ///
    /// Settling an order that already has a history row changes nothing and
    /// returns the recorded outcome, so a settlement may be retried as a whole.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user row is gone
    /// - `DatabaseError` on any failure; nothing is committed
    async fn settle(&self, settlement: &Settlement) -> Result<SettlementOutcome, DomainError>;
}
