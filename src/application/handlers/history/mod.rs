//! Transaction history query handlers.

mod list_transaction_history;

pub use list_transaction_history::ListTransactionHistoryHandler;
