//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Account sign-up, login, cart mutations and checkout are commands; catalog
//! and history are queries.

pub mod handlers;

pub use handlers::{
    CartLedger, CheckoutCoordinator, CheckoutReceipt, ListCreditItemsHandler,
    ListTransactionHistoryHandler, LoginUserCommand, LoginUserHandler, LoginUserResult,
    RegisterUserCommand, RegisterUserHandler, ResetPasswordCommand, ResetPasswordHandler,
};
