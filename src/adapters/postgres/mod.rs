//! PostgreSQL adapters - Database implementations for the store ports.
//!
//! - `PostgresCreditCatalog` - Read-only credit item lookups
//! - `PostgresCartRepository` - Versioned cart entry writes
//! - `PostgresUserAccounts` - Account sign-up, login lookups and customer details
//! - `PostgresSettlementStore` - Pending charges and transactional settlement
//! - `PostgresTransactionHistoryReader` - History queries
//!
//! Schema lives in `migrations/` and is applied with `sqlx::migrate!`.

mod cart_repository;
mod credit_catalog;
mod settlement_store;
mod transaction_history;
mod user_accounts;

pub use cart_repository::PostgresCartRepository;
pub use credit_catalog::PostgresCreditCatalog;
pub use settlement_store::PostgresSettlementStore;
pub use transaction_history::PostgresTransactionHistoryReader;
pub use user_accounts::PostgresUserAccounts;

/// Name of the constraint a database error violated, if any.
fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
