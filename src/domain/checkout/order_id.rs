//! Order identifiers.
//!
//! Each checkout attempt gets a fresh order id. The gateway treats it as
//! the idempotency key for the charge, and the history table keeps it
//! unique.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Gateway-facing identifier of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of order ids. Shared across request tasks.
pub trait OrderIdGenerator: Send + Sync {
    fn next_order_id(&self) -> OrderId;
}

/// Production generator: `CS-` followed by a random v4 UUID in hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOrderIdGenerator;

impl RandomOrderIdGenerator {
    pub const PREFIX: &'static str = "CS-";
}

impl OrderIdGenerator for RandomOrderIdGenerator {
    fn next_order_id(&self) -> OrderId {
        OrderId(format!("{}{}", Self::PREFIX, Uuid::new_v4().simple()))
    }
}

/// Deterministic generator producing `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialOrderIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialOrderIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl OrderIdGenerator for SequentialOrderIdGenerator {
    fn next_order_id(&self) -> OrderId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        OrderId(format!("{}-{}", self.prefix, n))
    }
}
