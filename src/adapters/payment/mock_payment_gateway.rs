//! Mock payment gateway for testing.
//!
//! Supports:
//! - A configurable charge status
//! - Error injection
//! - An artificial response delay (for timeout and interleaving tests)
//! - Call tracking

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{ChargeRequest, ChargeResult, ChargeStatus, PaymentError, PaymentGateway};

/// Mock payment gateway for testing.
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.set_status(ChargeStatus::Deny);
/// gateway.set_delay(Duration::from_secs(5));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Status reported for accepted calls. Defaults to settlement.
    status: Option<ChargeStatus>,

    /// Error to return on the next call.
    next_error: Option<PaymentError>,

    /// Delay before answering.
    delay: Option<Duration>,

    /// Every request received, in order.
    charges: Vec<ChargeRequest>,
}

impl MockPaymentGateway {
    /// Create a gateway that settles every charge immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this status for subsequent charges.
    pub fn set_status(&self, status: ChargeStatus) {
        self.state().status = Some(status);
    }

    /// Fail the next charge with this error.
    pub fn fail_next(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Wait this long before answering each charge.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// All charge requests received so far.
    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.state().charges.clone()
    }

    /// Number of charge requests received so far.
    pub fn charge_count(&self) -> usize {
        self.state().charges.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, PaymentError> {
        let (delay, outcome) = {
            let mut state = self.state();
            state.charges.push(request.clone());
            let outcome = match state.next_error.take() {
                Some(error) => Err(error),
                None => Ok(state.status.unwrap_or(ChargeStatus::Settlement)),
            };
            (state.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let status = outcome?;
        if !status.is_accepted() {
            return Err(PaymentError::declined(format!("Charge {}", status))
                .with_provider_code(status.as_str()));
        }

        Ok(ChargeResult {
            transaction_id: format!("mock-{}", request.order_id),
            order_id: request.order_id,
            status,
            actions: Vec::new(),
        })
    }
}
