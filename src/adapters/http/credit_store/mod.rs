//! HTTP adapter for the credit store.
//!
//! Exposes catalog, cart, checkout and history under
//! `/api/user/credit-store`.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{handle_cart_error, handle_checkout_error, CreditStoreAppState};
pub use routes::credit_store_routes;
