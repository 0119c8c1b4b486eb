//! Account-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 422 |
//! | EmailTaken | 409 |
//! | NotFound | 404 |
//! | WrongPassword | 403 |
//! | Storage | 500 |

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised by registration, login and password reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// The submitted form is not acceptable.
    ValidationFailed { field: String, message: String },

    /// Another account already uses this email.
    EmailTaken(String),

    /// No account matches the email or id.
    NotFound(String),

    /// The password does not match the stored hash.
    WrongPassword,

    /// Storage, hashing or token signing failed.
    Storage(String),
}

impl AccountError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AccountError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        AccountError::EmailTaken(email.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AccountError::NotFound(what.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        AccountError::Storage(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AccountError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AccountError::EmailTaken(_) => ErrorCode::EmailTaken,
            AccountError::NotFound(_) => ErrorCode::UserNotFound,
            AccountError::WrongPassword => ErrorCode::WrongPassword,
            AccountError::Storage(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            AccountError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            AccountError::EmailTaken(email) => format!("Email {} is already registered", email),
            AccountError::NotFound(what) => format!("Account {} not found", what),
            AccountError::WrongPassword => "Wrong password".to_string(),
            AccountError::Storage(msg) => format!("Storage error: {}", msg),
        }
    }
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AccountError {}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::EmailTaken => AccountError::EmailTaken(
                err.details.get("email").cloned().unwrap_or(err.message),
            ),
            ErrorCode::UserNotFound | ErrorCode::NotFound => AccountError::NotFound(err.message),
            _ => AccountError::Storage(err.to_string()),
        }
    }
}
