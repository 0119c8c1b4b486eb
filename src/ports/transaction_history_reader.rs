//! Transaction history reader port.

use crate::domain::checkout::TransactionHistory;
use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait TransactionHistoryReader: Send + Sync {
    /// The user's settled checkouts, newest first.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<TransactionHistory>, DomainError>;
}
