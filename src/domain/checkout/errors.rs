//! Checkout-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | EmptyCart | 409 |
//! | InProgress | 409 |
//! | InvalidState | 409 |
//! | UserNotFound | 404 |
//! | GatewayRejected | 502 |
//! | GatewayTimeout | 504 |
//! | SettlementFailed | 500 |
//! | Storage | 500 |

use super::OrderId;
use crate::domain::cart::CartError;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Errors raised while checking out a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to pay for.
    EmptyCart,

    /// Another checkout for the same user has not finished yet.
    InProgress(UserId),

    /// The checkout lifecycle was driven through an illegal edge.
    InvalidState(String),

    /// The user account backing the request does not exist.
    UserNotFound(UserId),

    /// The gateway refused the charge or could not be reached.
    GatewayRejected { order_id: OrderId, reason: String },

    /// The gateway did not answer within the charge timeout.
    GatewayTimeout { order_id: OrderId, seconds: u64 },

    /// The charge went through but settlement could not be committed.
    SettlementFailed { order_id: OrderId, reason: String },

    /// The store failed before any charge was attempted.
    Storage(String),
}

impl CheckoutError {
    pub fn in_progress(user_id: UserId) -> Self {
        CheckoutError::InProgress(user_id)
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        CheckoutError::InvalidState(reason.into())
    }

    pub fn user_not_found(user_id: UserId) -> Self {
        CheckoutError::UserNotFound(user_id)
    }

    pub fn gateway_rejected(order_id: OrderId, reason: impl Into<String>) -> Self {
        CheckoutError::GatewayRejected {
            order_id,
            reason: reason.into(),
        }
    }

    pub fn gateway_timeout(order_id: OrderId, seconds: u64) -> Self {
        CheckoutError::GatewayTimeout { order_id, seconds }
    }

    pub fn settlement_failed(order_id: OrderId, reason: impl Into<String>) -> Self {
        CheckoutError::SettlementFailed {
            order_id,
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        CheckoutError::Storage(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::EmptyCart => ErrorCode::EmptyCart,
            CheckoutError::InProgress(_) | CheckoutError::InvalidState(_) => {
                ErrorCode::InvalidState
            }
            CheckoutError::UserNotFound(_) => ErrorCode::UserNotFound,
            CheckoutError::GatewayRejected { .. } => ErrorCode::PaymentFailed,
            CheckoutError::GatewayTimeout { .. } => ErrorCode::GatewayTimeout,
            CheckoutError::SettlementFailed { .. } | CheckoutError::Storage(_) => {
                ErrorCode::DatabaseError
            }
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            CheckoutError::EmptyCart => "Cart is empty".to_string(),
            CheckoutError::InProgress(_) => {
                "A checkout is already in progress for this user".to_string()
            }
            CheckoutError::InvalidState(reason) => reason.clone(),
            CheckoutError::UserNotFound(id) => format!("User {} not found", id),
            CheckoutError::GatewayRejected { order_id, reason } => {
                format!("Payment for order {} failed: {}", order_id, reason)
            }
            CheckoutError::GatewayTimeout { order_id, seconds } => format!(
                "Payment gateway did not answer for order {} within {}s",
                order_id, seconds
            ),
            CheckoutError::SettlementFailed { order_id, reason } => format!(
                "Order {} was charged but could not be settled: {}",
                order_id, reason
            ),
            CheckoutError::Storage(msg) => format!("Storage error: {}", msg),
        }
    }

    /// The order id, once one has been issued.
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            CheckoutError::GatewayRejected { order_id, .. }
            | CheckoutError::GatewayTimeout { order_id, .. }
            | CheckoutError::SettlementFailed { order_id, .. } => Some(order_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CheckoutError {}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EmptyCart => CheckoutError::EmptyCart,
            ErrorCode::InvalidState => CheckoutError::InvalidState(err.message),
            _ => CheckoutError::Storage(err.to_string()),
        }
    }
}

/// A cart that cannot be read as a whole (unrepresentable totals) cannot be
/// checked out.
impl From<CartError> for CheckoutError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Storage(msg) => CheckoutError::Storage(msg),
            other => CheckoutError::InvalidState(other.message()),
        }
    }
}

impl From<CheckoutError> for DomainError {
    fn from(err: CheckoutError) -> Self {
        let order_id = err.order_id().map(|o| o.to_string());
        let domain = DomainError::new(err.code(), err.message());
        match order_id {
            Some(order_id) => domain.with_detail("order_id", order_id),
            None => domain,
        }
    }
}
