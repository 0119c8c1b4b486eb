//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over ports.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod history;

pub use account::{
    LoginUserCommand, LoginUserHandler, LoginUserResult, RegisterUserCommand, RegisterUserHandler,
    ResetPasswordCommand, ResetPasswordHandler,
};
pub use cart::CartLedger;
pub use catalog::ListCreditItemsHandler;
pub use checkout::{CheckoutCoordinator, CheckoutReceipt};
pub use history::ListTransactionHistoryHandler;
