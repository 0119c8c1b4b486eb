use serde::Serialize;

use super::{CartEntry, CartError};

/// Read model of a user's cart with its aggregate totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub entries: Vec<CartEntry>,
    pub total_price: i64,
    pub total_points: i64,
}

impl CartView {
    /// Builds the view, keeping the entries in the order given.
    ///
    /// Fails when either total does not fit in an `i64`.
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, CartError> {
        let total_price = checked_total(&entries, |e| e.price)
            .ok_or_else(|| CartError::validation("total_price", "cart total overflows"))?;
        let total_points = checked_total(&entries, |e| e.points)
            .ok_or_else(|| CartError::validation("total_points", "cart points overflow"))?;
        Ok(Self {
            entries,
            total_price,
            total_points,
        })
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            total_price: 0,
            total_points: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn checked_total(entries: &[CartEntry], field: impl Fn(&CartEntry) -> i64) -> Option<i64> {
    entries
        .iter()
        .try_fold(0i64, |total, entry| total.checked_add(field(entry)))
}
