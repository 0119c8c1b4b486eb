//! Cart handlers.

mod ledger;

pub use ledger::{CartLedger, DEFAULT_MAX_ATTEMPTS};
