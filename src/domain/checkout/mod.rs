//! Checkout domain module.
//!
//! # Module Structure
//!
//! - `state` - CheckoutState lifecycle
//! - `order_id` - OrderId and its generators
//! - `customer` - Contact details sent with a charge
//! - `settlement` - Settlement plan and cart reconciliation
//! - `history` - TransactionHistory record
//! - `errors` - CheckoutError

mod customer;
mod errors;
mod history;
mod order_id;
mod settlement;
mod state;

pub use customer::Customer;
pub use errors::CheckoutError;
pub use history::TransactionHistory;
pub use order_id::{OrderId, OrderIdGenerator, RandomOrderIdGenerator, SequentialOrderIdGenerator};
pub use settlement::{reconcile, CartAdjustment, Settlement};
pub use state::CheckoutState;
