use serde::{Deserialize, Serialize};

use super::OrderId;
use crate::domain::foundation::{Timestamp, TransactionHistoryId, UserId};

/// Immutable record of one settled checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub id: TransactionHistoryId,
    pub user_id: UserId,
    pub order_id: OrderId,
    pub price: i64,
    pub points: i64,
    pub created_at: Timestamp,
}

impl TransactionHistory {
    /// Creates the record for a checkout settling now.
    pub fn record(user_id: UserId, order_id: OrderId, price: i64, points: i64) -> Self {
        Self {
            id: TransactionHistoryId::new(),
            user_id,
            order_id,
            price,
            points,
            created_at: Timestamp::now(),
        }
    }
}
