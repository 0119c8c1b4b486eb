//! Catalog domain module.
//!
//! Credit items are read-only to this system: they are administered
//! elsewhere and only looked up when a cart is mutated.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CreditItemId;

/// A purchasable bundle of loyalty points.
///
/// `price` is in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditItem {
    pub id: CreditItemId,
    pub price: i64,
    pub points: i64,
}

impl CreditItem {
    pub fn new(id: CreditItemId, price: i64, points: i64) -> Self {
        Self { id, price, points }
    }
}
