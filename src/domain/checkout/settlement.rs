//! Settlement of a charged cart.
//!
//! A settlement is built from the cart snapshot taken before the charge.
//! When it is applied, the store re-reads the user's cart under lock and
//! asks [`reconcile`] what to change: exactly the snapshotted units are
//! removed, anything added while the charge was in flight stays put.

use serde::{Deserialize, Serialize};

use super::{OrderId, TransactionHistory};
use crate::domain::cart::{CartEntry, CartView};
use crate::domain::foundation::{CartEntryId, UserId};

/// Everything needed to settle one successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub snapshot: Vec<CartEntry>,
    pub total_price: i64,
    pub total_points: i64,
}

impl Settlement {
    pub fn from_cart(user_id: UserId, order_id: OrderId, cart: &CartView) -> Self {
        Self {
            user_id,
            order_id,
            snapshot: cart.entries.clone(),
            total_price: cart.total_price,
            total_points: cart.total_points,
        }
    }

    /// The history row this settlement writes.
    pub fn history_record(&self) -> TransactionHistory {
        TransactionHistory::record(
            self.user_id,
            self.order_id.clone(),
            self.total_price,
            self.total_points,
        )
    }
}

/// One change to apply to the live cart during settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAdjustment {
    /// Every unit of the entry was paid for.
    Delete(CartEntryId),
    /// Units were added during the charge; keep the remainder.
    Reduce(CartEntry),
}

/// Works out how the live cart must change to remove the paid-for units.
///
/// Entries are matched by credit item. An item removed from the cart while
/// the charge was running needs no change.
pub fn reconcile(current: &[CartEntry], snapshot: &[CartEntry]) -> Vec<CartAdjustment> {
    snapshot
        .iter()
        .filter_map(|paid| {
            let live = current
                .iter()
                .find(|e| e.credit_item_id == paid.credit_item_id)?;

            if live.quantity <= paid.quantity {
                return Some(CartAdjustment::Delete(live.id));
            }

            let mut remaining = live.clone();
            remaining.quantity -= paid.quantity;
            remaining.price -= paid.price;
            remaining.points -= paid.points;
            Some(CartAdjustment::Reduce(remaining))
        })
        .collect()
}
