//! CheckoutCoordinator - Charges a user's cart and settles it.
//!
//! Flow:
//! 1. Claim the user's checkout slot (one checkout per user at a time)
//! 2. Finish any earlier charge whose settlement never committed, then stop
//! 3. Snapshot the cart; an empty cart ends here
//! 4. Charge the snapshot total through the gateway, bounded by a timeout
//! 5. Record the accepted charge as pending
//! 6. Settle: award points, clear the paid units, record history, drop the
//!    pending record. Failed attempts are retried with backoff.
//!
//! Settlement runs on its own task and keeps the checkout slot until it
//! commits, so a caller that goes away mid-request cannot cancel it or let a
//! second checkout in early.
//!
//! A user is never charged while a pending record exists: step 2 settles the
//! earlier order under its original order id instead of charging again.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::domain::cart::CartView;
use crate::domain::checkout::{
    CheckoutError, CheckoutState, OrderId, OrderIdGenerator, Settlement, TransactionHistory,
};
use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, UserId};
use crate::ports::{
    CartRepository, ChargeRequest, ChargeResult, PaymentGateway, PendingSettlement,
    SettlementOutcome, SettlementStore, UserAccountReader,
};

/// Default upper bound on a single gateway charge.
pub const DEFAULT_CHARGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of settle attempts before a checkout reports failure.
pub const DEFAULT_SETTLEMENT_ATTEMPTS: u32 = 3;

/// Delay before the first settle retry; doubles on each further attempt.
pub const DEFAULT_SETTLEMENT_BACKOFF: Duration = Duration::from_millis(100);

/// Everything the caller learns from a completed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub charge: ChargeResult,
    pub history: TransactionHistory,
    pub point_balance: i64,
    /// The cart after settlement; only units added mid-charge remain.
    pub cart: CartView,
}

pub struct CheckoutCoordinator {
    carts: Arc<dyn CartRepository>,
    accounts: Arc<dyn UserAccountReader>,
    gateway: Arc<dyn PaymentGateway>,
    settlements: Arc<dyn SettlementStore>,
    order_ids: Arc<dyn OrderIdGenerator>,
    charge_timeout: Duration,
    retry: SettleRetry,
    in_flight: Arc<Mutex<HashSet<UserId>>>,
}

#[derive(Debug, Clone, Copy)]
struct SettleRetry {
    attempts: u32,
    backoff: Duration,
}

impl CheckoutCoordinator {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        accounts: Arc<dyn UserAccountReader>,
        gateway: Arc<dyn PaymentGateway>,
        settlements: Arc<dyn SettlementStore>,
        order_ids: Arc<dyn OrderIdGenerator>,
    ) -> Self {
        Self {
            carts,
            accounts,
            gateway,
            settlements,
            order_ids,
            charge_timeout: DEFAULT_CHARGE_TIMEOUT,
            retry: SettleRetry {
                attempts: DEFAULT_SETTLEMENT_ATTEMPTS,
                backoff: DEFAULT_SETTLEMENT_BACKOFF,
            },
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_charge_timeout(mut self, timeout: Duration) -> Self {
        self.charge_timeout = timeout;
        self
    }

    /// How often settlement is attempted within one checkout (at least once)
    /// and the delay before the first retry.
    pub fn with_settlement_retries(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry = SettleRetry {
            attempts: attempts.max(1),
            backoff,
        };
        self
    }

    /// Runs one checkout for the user.
    ///
    /// If an earlier charge is still awaiting settlement, this settles that
    /// order and returns its receipt without charging again.
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, CheckoutError> {
        let slot = CheckoutSlot::claim(&self.in_flight, user_id)?;
        let mut state = CheckoutState::Idle;

        if let Some(pending) = self.settlements.pending_for_user(&user_id).await? {
            let PendingSettlement {
                settlement, charge, ..
            } = pending;
            tracing::warn!(
                user_id = %user_id,
                order_id = %settlement.order_id,
                transaction_id = %charge.transaction_id,
                "Resuming settlement of an earlier charge"
            );
            state = advance(user_id, &settlement.order_id, state, CheckoutState::Settling)?;
            return self.settle(slot, state, settlement, charge).await;
        }

        let cart = CartView::from_entries(self.carts.list_for_user(&user_id).await?)?;
        if cart.is_empty() {
            return Err(fail(user_id, state, CheckoutError::EmptyCart));
        }

        let customer = match self.accounts.find_customer(&user_id).await? {
            Some(customer) => customer,
            None => return Err(fail(user_id, state, CheckoutError::user_not_found(user_id))),
        };

        let order_id = self.order_ids.next_order_id();
        state = advance(user_id, &order_id, state, CheckoutState::Charging)?;

        let request = ChargeRequest {
            order_id: order_id.clone(),
            gross_amount: cart.total_price,
            customer,
        };
        let charge = match tokio::time::timeout(self.charge_timeout, self.gateway.charge(request))
            .await
        {
            Ok(Ok(charge)) => charge,
            Ok(Err(e)) => {
                let err = CheckoutError::gateway_rejected(order_id, e.to_string());
                return Err(fail(user_id, state, err));
            }
            Err(_) => {
                let err = CheckoutError::gateway_timeout(order_id, self.charge_timeout.as_secs());
                return Err(fail(user_id, state, err));
            }
        };

        state = advance(user_id, &order_id, state, CheckoutState::Settling)?;

        let settlement = Settlement::from_cart(user_id, order_id.clone(), &cart);
        let pending = PendingSettlement::new(settlement.clone(), charge.clone());
        if let Err(e) = self.settlements.record_pending(&pending).await {
            tracing::error!(
                user_id = %user_id,
                order_id = %order_id,
                transaction_id = %charge.transaction_id,
                error = %e,
                "Could not record pending settlement"
            );
        }

        self.settle(slot, state, settlement, charge).await
    }

    async fn settle(
        &self,
        slot: CheckoutSlot,
        state: CheckoutState,
        settlement: Settlement,
        charge: ChargeResult,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let user_id = settlement.user_id;
        let order_id = settlement.order_id.clone();
        let settlements = Arc::clone(&self.settlements);
        let retry = self.retry;
        let settling = tokio::spawn(async move {
            let outcome = settle_with_retry(settlements.as_ref(), &settlement, retry).await;
            drop(slot);
            outcome
        });

        let outcome = match settling.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::error!(
                    user_id = %user_id,
                    order_id = %order_id,
                    transaction_id = %charge.transaction_id,
                    error = %e,
                    "Charge succeeded but settlement failed"
                );
                let err = CheckoutError::settlement_failed(order_id, e.message);
                return Err(fail(user_id, state, err));
            }
            Err(join_error) => {
                let err = CheckoutError::settlement_failed(order_id, join_error.to_string());
                return Err(fail(user_id, state, err));
            }
        };

        advance(user_id, &order_id, state, CheckoutState::Done)?;
        tracing::info!(
            user_id = %user_id,
            order_id = %order_id,
            price = outcome.history.price,
            points = outcome.history.points,
            "Checkout settled"
        );

        Ok(CheckoutReceipt {
            order_id,
            charge,
            history: outcome.history,
            point_balance: outcome.point_balance,
            cart: CartView::from_entries(outcome.remaining)?,
        })
    }
}

/// Settles, retrying failed attempts. A vanished user is not retried.
async fn settle_with_retry(
    store: &dyn SettlementStore,
    settlement: &Settlement,
    retry: SettleRetry,
) -> Result<SettlementOutcome, DomainError> {
    let mut delay = retry.backoff;
    let mut attempt = 1;
    loop {
        match store.settle(settlement).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if attempt < retry.attempts && e.code != ErrorCode::UserNotFound => {
                tracing::warn!(
                    order_id = %settlement.order_id,
                    attempt,
                    error = %e,
                    "Settlement attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn advance(
    user_id: UserId,
    order_id: &OrderId,
    from: CheckoutState,
    to: CheckoutState,
) -> Result<CheckoutState, CheckoutError> {
    let next = from
        .transition_to(to)
        .map_err(|e| CheckoutError::invalid_state(e.to_string()))?;
    tracing::debug!(
        user_id = %user_id,
        order_id = %order_id,
        state = %next,
        "Checkout advanced"
    );
    Ok(next)
}

fn fail(user_id: UserId, from: CheckoutState, err: CheckoutError) -> CheckoutError {
    tracing::warn!(
        user_id = %user_id,
        from = %from,
        state = %CheckoutState::Failed,
        code = %err.code(),
        error = %err,
        "Checkout failed"
    );
    err
}

/// Marks a user as having a checkout in flight until dropped.
struct CheckoutSlot {
    in_flight: Arc<Mutex<HashSet<UserId>>>,
    user_id: UserId,
}

impl CheckoutSlot {
    fn claim(
        in_flight: &Arc<Mutex<HashSet<UserId>>>,
        user_id: UserId,
    ) -> Result<Self, CheckoutError> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id);
        if !inserted {
            return Err(fail(
                user_id,
                CheckoutState::Idle,
                CheckoutError::in_progress(user_id),
            ));
        }
        Ok(Self {
            in_flight: Arc::clone(in_flight),
            user_id,
        })
    }
}

impl Drop for CheckoutSlot {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}
