//! Checkout handlers.

mod coordinator;

pub use coordinator::{
    CheckoutCoordinator, CheckoutReceipt, DEFAULT_CHARGE_TIMEOUT, DEFAULT_SETTLEMENT_ATTEMPTS,
    DEFAULT_SETTLEMENT_BACKOFF,
};
