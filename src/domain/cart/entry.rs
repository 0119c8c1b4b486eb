//! Cart entry aggregate.
//!
//! One entry exists per (user, credit item). `price` and `points` are
//! cumulative: they always equal `quantity` times the catalog unit values.

use serde::{Deserialize, Serialize};

use super::CartError;
use crate::domain::catalog::CreditItem;
use crate::domain::foundation::{CartEntryId, CreditItemId, OwnedByUser, Timestamp, UserId};

/// A single line of a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub user_id: UserId,
    pub credit_item_id: CreditItemId,
    pub points: i64,
    pub price: i64,
    pub quantity: i64,
    /// Optimistic-concurrency counter, bumped by the store on every write.
    pub version: i64,
    pub created_at: Timestamp,
}

/// Outcome of taking one unit off an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRemoval {
    /// Units remain; the entry should be updated.
    Remaining,
    /// Quantity hit zero; the entry should be deleted.
    Emptied,
}

impl CartEntry {
    /// Opens a new entry holding a single unit of `item`.
    pub fn open(user_id: UserId, item: &CreditItem) -> Self {
        Self {
            id: CartEntryId::new(),
            user_id,
            credit_item_id: item.id,
            points: item.points,
            price: item.price,
            quantity: 1,
            version: 0,
            created_at: Timestamp::now(),
        }
    }

    /// Adds one unit of `item` to the cumulative fields.
    pub fn add_unit(&mut self, item: &CreditItem) -> Result<(), CartError> {
        self.ensure_same_item(item)?;

        let quantity = self.quantity.checked_add(1);
        let price = self.price.checked_add(item.price);
        let points = self.points.checked_add(item.points);

        match (quantity, price, points) {
            (Some(quantity), Some(price), Some(points)) => {
                self.quantity = quantity;
                self.price = price;
                self.points = points;
                Ok(())
            }
            _ => Err(CartError::validation("quantity", "cart entry totals overflow")),
        }
    }

    /// Takes one unit of `item` off the cumulative fields.
    ///
    /// Rejects the mutation rather than letting quantity go negative.
    pub fn remove_unit(&mut self, item: &CreditItem) -> Result<UnitRemoval, CartError> {
        self.ensure_same_item(item)?;

        if self.quantity <= 0 {
            return Err(CartError::invalid_state(format!(
                "Credit item {} has no units left to remove",
                self.credit_item_id
            )));
        }

        self.quantity -= 1;
        self.price -= item.price;
        self.points -= item.points;

        if self.quantity == 0 {
            Ok(UnitRemoval::Emptied)
        } else {
            Ok(UnitRemoval::Remaining)
        }
    }

    /// Returns true when no units are left.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    fn ensure_same_item(&self, item: &CreditItem) -> Result<(), CartError> {
        if item.id == self.credit_item_id {
            Ok(())
        } else {
            Err(CartError::invalid_state(format!(
                "Cart entry for credit item {} cannot take units of credit item {}",
                self.credit_item_id, item.id
            )))
        }
    }
}

impl OwnedByUser for CartEntry {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}
