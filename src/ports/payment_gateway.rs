//! Payment gateway port for charging a checkout.
//!
//! A charge is a single synchronous call from the coordinator's point of
//! view: the order id doubles as the gateway's idempotency key, the amount
//! is the cart total in the smallest currency unit.

use crate::domain::checkout::{Customer, OrderId};
use crate::domain::foundation::{DomainError, ErrorCode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for external charge services.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit a charge.
    ///
    /// Returns the gateway's answer when the charge was accepted, and a
    /// `PaymentError` when it was refused or could not be submitted.
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError>;
}

/// A single charge submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub order_id: OrderId,
    pub gross_amount: i64,
    pub customer: Customer,
}

/// The gateway's answer to an accepted charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeResult {
    pub order_id: OrderId,

    /// Gateway-side reference for the charge.
    pub transaction_id: String,

    pub status: ChargeStatus,

    /// Follow-up actions for the payer (e-wallet deeplinks, QR codes).
    #[serde(default)]
    pub actions: Vec<ChargeAction>,
}

/// A follow-up action the payer has to take to complete the charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeAction {
    pub name: String,
    pub method: String,
    pub url: String,
}

/// Charge status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    /// Card charge captured.
    Capture,

    /// Funds settled.
    Settlement,

    /// Waiting for the payer (e-wallet approval).
    Pending,

    /// Refused by the gateway or the fraud check.
    Deny,

    /// Cancelled.
    Cancel,

    /// Payer did not complete in time.
    Expire,

    /// Processing failed.
    Failure,
}

impl ChargeStatus {
    /// Parses the gateway's `transaction_status` string.
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "capture" => Some(ChargeStatus::Capture),
            "settlement" => Some(ChargeStatus::Settlement),
            "pending" => Some(ChargeStatus::Pending),
            "deny" => Some(ChargeStatus::Deny),
            "cancel" => Some(ChargeStatus::Cancel),
            "expire" => Some(ChargeStatus::Expire),
            "failure" => Some(ChargeStatus::Failure),
            _ => None,
        }
    }

    /// Returns true if the charge counts as accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            ChargeStatus::Capture | ChargeStatus::Settlement | ChargeStatus::Pending
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Capture => "capture",
            ChargeStatus::Settlement => "settlement",
            ChargeStatus::Pending => "pending",
            ChargeStatus::Deny => "deny",
            ChargeStatus::Cancel => "cancel",
            ChargeStatus::Expire => "expire",
            ChargeStatus::Failure => "failure",
        }
    }
}

impl std::fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment gateway error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own status code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the gateway's status code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Declined, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let domain = DomainError::new(ErrorCode::PaymentFailed, err.message);
        match err.provider_code {
            Some(code) => domain.with_detail("provider_code", code),
            None => domain,
        }
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Server key rejected.
    AuthenticationError,

    /// The charge was refused (deny, cancel, expire, failure).
    Declined,

    /// The gateway rejected the request body.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Gateway-side error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::Declined => "declined",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn accepted_statuses() {
        assert!(ChargeStatus::Capture.is_accepted());
        assert!(ChargeStatus::Settlement.is_accepted());
        assert!(ChargeStatus::Pending.is_accepted());

        assert!(!ChargeStatus::Deny.is_accepted());
        assert!(!ChargeStatus::Cancel.is_accepted());
        assert!(!ChargeStatus::Expire.is_accepted());
        assert!(!ChargeStatus::Failure.is_accepted());
    }

    #[test]
    fn status_parses_gateway_strings() {
        for status in [
            ChargeStatus::Capture,
            ChargeStatus::Settlement,
            ChargeStatus::Pending,
            ChargeStatus::Deny,
            ChargeStatus::Cancel,
            ChargeStatus::Expire,
            ChargeStatus::Failure,
        ] {
            assert_eq!(ChargeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ChargeStatus::parse("authorize"), None);
    }

    #[test]
    fn payment_error_retryable() {
        assert!(PaymentError::network("reset").retryable);
        assert!(!PaymentError::declined("deny").retryable);
    }

    #[test]
    fn payment_error_display() {
        let err = PaymentError::declined("transaction denied");
        assert_eq!(err.to_string(), "declined: transaction denied");
    }

    #[test]
    fn domain_conversion_keeps_provider_code() {
        let err: DomainError = PaymentError::provider("down").with_provider_code("500").into();
        assert_eq!(err.code, ErrorCode::PaymentFailed);
        assert_eq!(err.details.get("provider_code"), Some(&"500".to_string()));
    }
}
