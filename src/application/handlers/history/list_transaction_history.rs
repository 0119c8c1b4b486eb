//! ListTransactionHistoryHandler - Query handler for a user's settled checkouts.

use std::sync::Arc;

use crate::domain::checkout::TransactionHistory;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::TransactionHistoryReader;

pub struct ListTransactionHistoryHandler {
    reader: Arc<dyn TransactionHistoryReader>,
}

impl ListTransactionHistoryHandler {
    pub fn new(reader: Arc<dyn TransactionHistoryReader>) -> Self {
        Self { reader }
    }

    /// The user's history, newest first.
    pub async fn handle(&self, user_id: UserId) -> Result<Vec<TransactionHistory>, DomainError> {
        self.reader.list_for_user(&user_id).await
    }
}
