//! Cart-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ItemNotFound | 404 |
//! | NotInCart | 404 |
//! | EntryNotFound | 404 |
//! | Forbidden | 403 |
//! | InvalidState | 409 |
//! | Conflict | 409 |
//! | ValidationFailed | 400 |
//! | Storage | 500 |

use crate::domain::foundation::{CartEntryId, CreditItemId, DomainError, ErrorCode};

/// Errors raised by cart mutations and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The credit item does not exist in the catalog.
    ItemNotFound(CreditItemId),

    /// The caller has no cart entry for this credit item.
    NotInCart(CreditItemId),

    /// No cart entry exists with this id.
    EntryNotFound(CartEntryId),

    /// The cart entry belongs to someone else.
    Forbidden(CartEntryId),

    /// The entry cannot take the requested mutation.
    InvalidState(String),

    /// Concurrent writers kept winning until the retry budget ran out.
    Conflict(String),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// The store failed.
    Storage(String),
}

impl CartError {
    pub fn item_not_found(id: CreditItemId) -> Self {
        CartError::ItemNotFound(id)
    }

    pub fn not_in_cart(id: CreditItemId) -> Self {
        CartError::NotInCart(id)
    }

    pub fn entry_not_found(id: CartEntryId) -> Self {
        CartError::EntryNotFound(id)
    }

    pub fn forbidden(id: CartEntryId) -> Self {
        CartError::Forbidden(id)
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        CartError::InvalidState(reason.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        CartError::Conflict(reason.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CartError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        CartError::Storage(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CartError::ItemNotFound(_) => ErrorCode::CreditItemNotFound,
            CartError::NotInCart(_) | CartError::EntryNotFound(_) => ErrorCode::CartEntryNotFound,
            CartError::Forbidden(_) => ErrorCode::Forbidden,
            CartError::InvalidState(_) => ErrorCode::InvalidState,
            CartError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            CartError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CartError::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            CartError::ItemNotFound(id) => format!("Credit item {} not found", id),
            CartError::NotInCart(id) => format!("Credit item {} is not in the cart", id),
            CartError::EntryNotFound(id) => format!("Cart entry {} not found", id),
            CartError::Forbidden(_) => "Cart entry belongs to another user".to_string(),
            CartError::InvalidState(reason) => reason.clone(),
            CartError::Conflict(reason) => format!("Cart was modified concurrently: {}", reason),
            CartError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CartError::Storage(msg) => format!("Storage error: {}", msg),
        }
    }
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CartError {}

impl From<DomainError> for CartError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidState => CartError::InvalidState(err.message),
            ErrorCode::ConcurrencyConflict => CartError::Conflict(err.message),
            ErrorCode::ValidationFailed => CartError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => CartError::Storage(err.to_string()),
        }
    }
}

impl From<CartError> for DomainError {
    fn from(err: CartError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
