//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, error types and the small behavioural traits
//! that the catalog, cart and checkout modules build on.

mod auth;
mod errors;
mod ids;
mod ownership;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CartEntryId, CreditItemId, TransactionHistoryId, UserId};
pub use ownership::OwnedByUser;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
