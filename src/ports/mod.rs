//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `CreditCatalog` - Read-only credit item lookup
//! - `CartRepository` - Versioned cart entry persistence
//! - `UserAccountReader` - Customer contact details
//! - `UserAccountRepository` - Account sign-up, lookup and password changes
//! - `SettlementStore` - Atomic settlement of a paid cart
//! - `TransactionHistoryReader` - Settled checkouts per user
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Charge submission
//! - `SessionValidator` - Bearer token validation
//! - `TokenIssuer` - Session token signing at login
//! - `PasswordHasher` - Password hashing and verification

mod cart_repository;
mod credit_catalog;
mod password_hasher;
mod payment_gateway;
mod session_validator;
mod settlement_store;
mod token_issuer;
mod transaction_history_reader;
mod user_account_reader;
mod user_account_repository;

pub use cart_repository::CartRepository;
pub use credit_catalog::CreditCatalog;
pub use password_hasher::PasswordHasher;
pub use payment_gateway::{
    ChargeAction, ChargeRequest, ChargeResult, ChargeStatus, PaymentError, PaymentErrorCode,
    PaymentGateway,
};
pub use session_validator::SessionValidator;
pub use settlement_store::{PendingSettlement, SettlementOutcome, SettlementStore};
pub use token_issuer::TokenIssuer;
pub use transaction_history_reader::TransactionHistoryReader;
pub use user_account_reader::UserAccountReader;
pub use user_account_repository::UserAccountRepository;
