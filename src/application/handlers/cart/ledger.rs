//! CartLedger - Per-user cart mutations and the cart view.
//!
//! Every mutation is a versioned read-modify-write against the
//! `CartRepository`. When another request wins the race the store answers
//! with a conflict and the ledger re-reads and tries again, up to
//! `max_attempts` times.

use std::future::Future;
use std::sync::Arc;

use crate::domain::cart::{CartEntry, CartError, CartView, UnitRemoval};
use crate::domain::catalog::CreditItem;
use crate::domain::foundation::{CartEntryId, CreditItemId, OwnedByUser, UserId};
use crate::ports::{CartRepository, CreditCatalog};

/// Attempts per mutation before a conflict is surfaced to the caller.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub struct CartLedger {
    catalog: Arc<dyn CreditCatalog>,
    carts: Arc<dyn CartRepository>,
    max_attempts: u32,
}

impl CartLedger {
    pub fn new(catalog: Arc<dyn CreditCatalog>, carts: Arc<dyn CartRepository>) -> Self {
        Self {
            catalog,
            carts,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Adds one unit of a credit item, opening an entry on first add.
    pub async fn add_item(
        &self,
        user_id: UserId,
        item_id: CreditItemId,
    ) -> Result<CartEntry, CartError> {
        let item = self.lookup(item_id).await?;
        let entry = self
            .with_retries("add_item", || self.try_add_unit(user_id, &item))
            .await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            quantity = entry.quantity,
            "Credit item added to cart"
        );
        Ok(entry)
    }

    /// Adds one unit to the entry for a credit item.
    ///
    /// Without an existing entry this behaves exactly like `add_item`.
    pub async fn increment_item(
        &self,
        user_id: UserId,
        item_id: CreditItemId,
    ) -> Result<CartEntry, CartError> {
        let item = self.lookup(item_id).await?;
        let entry = self
            .with_retries("increment_item", || self.try_add_unit(user_id, &item))
            .await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            quantity = entry.quantity,
            "Cart entry incremented"
        );
        Ok(entry)
    }

    /// Takes one unit off the entry for a credit item.
    ///
    /// Returns the updated entry, or `None` once the last unit is gone and
    /// the entry has been deleted.
    pub async fn decrement_item(
        &self,
        user_id: UserId,
        item_id: CreditItemId,
    ) -> Result<Option<CartEntry>, CartError> {
        let item = self.lookup(item_id).await?;
        let entry = self
            .with_retries("decrement_item", || self.try_remove_unit(user_id, &item))
            .await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            quantity = entry.as_ref().map(|e| e.quantity).unwrap_or(0),
            "Cart entry decremented"
        );
        Ok(entry)
    }

    /// Deletes a cart entry outright, whatever its quantity.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
    ) -> Result<(), CartError> {
        self.with_retries("remove_item", || self.try_remove_entry(user_id, entry_id))
            .await?;

        tracing::info!(user_id = %user_id, entry_id = %entry_id, "Cart entry removed");
        Ok(())
    }

    /// The user's cart with totals. An empty cart is not an error.
    pub async fn view_cart(&self, user_id: UserId) -> Result<CartView, CartError> {
        let entries = self.carts.list_for_user(&user_id).await?;
        CartView::from_entries(entries)
    }

    async fn lookup(&self, item_id: CreditItemId) -> Result<CreditItem, CartError> {
        self.catalog
            .find_by_id(&item_id)
            .await?
            .ok_or_else(|| CartError::item_not_found(item_id))
    }

    async fn try_add_unit(
        &self,
        user_id: UserId,
        item: &CreditItem,
    ) -> Result<CartEntry, CartError> {
        match self.carts.find_for_item(&user_id, &item.id).await? {
            Some(mut entry) => {
                entry.add_unit(item)?;
                Ok(self.carts.update(&entry).await?)
            }
            None => Ok(self.carts.insert(&CartEntry::open(user_id, item)).await?),
        }
    }

    async fn try_remove_unit(
        &self,
        user_id: UserId,
        item: &CreditItem,
    ) -> Result<Option<CartEntry>, CartError> {
        let mut entry = self
            .carts
            .find_for_item(&user_id, &item.id)
            .await?
            .ok_or_else(|| CartError::not_in_cart(item.id))?;

        match entry.remove_unit(item)? {
            UnitRemoval::Remaining => Ok(Some(self.carts.update(&entry).await?)),
            UnitRemoval::Emptied => {
                self.carts.delete(&entry).await?;
                Ok(None)
            }
        }
    }

    async fn try_remove_entry(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
    ) -> Result<(), CartError> {
        let entry = self
            .carts
            .find_by_id(&entry_id)
            .await?
            .ok_or_else(|| CartError::entry_not_found(entry_id))?;

        entry
            .check_ownership(&user_id)
            .map_err(|_| CartError::forbidden(entry_id))?;

        Ok(self.carts.delete(&entry).await?)
    }

    async fn with_retries<T, F, Fut>(
        &self,
        operation: &str,
        mut attempt: F,
    ) -> Result<T, CartError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CartError>>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt().await {
                Err(CartError::Conflict(reason)) if tries < self.max_attempts => {
                    tracing::debug!(
                        operation,
                        attempt = tries,
                        %reason,
                        "Cart write conflicted, retrying"
                    );
                }
                Err(CartError::Conflict(reason)) => {
                    tracing::warn!(
                        operation,
                        attempts = tries,
                        %reason,
                        "Cart write kept conflicting"
                    );
                    return Err(CartError::Conflict(reason));
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCreditStore;
    use crate::domain::checkout::Customer;
    use crate::domain::foundation::ErrorCode;

    const ITEM_A: i64 = 1;
    const ITEM_B: i64 = 2;

    async fn seeded_store() -> (Arc<InMemoryCreditStore>, UserId) {
        let store = Arc::new(InMemoryCreditStore::new());
        store
            .add_credit_item(CreditItem::new(CreditItemId::new(ITEM_A), 100, 10))
            .await;
        store
            .add_credit_item(CreditItem::new(CreditItemId::new(ITEM_B), 250, 30))
            .await;
        let user = UserId::new();
        store
            .add_user(user, Customer::new("Ana", "ana@example.com", "0800"), 0)
            .await;
        (store, user)
    }

    fn ledger(store: &Arc<InMemoryCreditStore>) -> CartLedger {
        CartLedger::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn add_item_opens_entry_then_accumulates() {
        let (store, user) = seeded_store().await;
        let ledger = ledger(&store);

        let first = ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();
        assert_eq!((first.price, first.points, first.quantity), (100, 10, 1));

        let second = ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!((second.price, second.points, second.quantity), (200, 20, 2));
    }

    #[tokio::test]
    async fn add_unknown_item_is_not_found() {
        let (store, user) = seeded_store().await;

        let err = ledger(&store)
            .add_item(user, CreditItemId::new(99))
            .await
            .unwrap_err();

        assert_eq!(err, CartError::item_not_found(CreditItemId::new(99)));
        assert_eq!(err.code(), ErrorCode::CreditItemNotFound);
    }

    #[tokio::test]
    async fn increment_without_entry_behaves_like_add() {
        let (store, user) = seeded_store().await;

        let entry = ledger(&store)
            .increment_item(user, CreditItemId::new(ITEM_B))
            .await
            .unwrap();

        assert_eq!((entry.price, entry.points, entry.quantity), (250, 30, 1));
    }

    #[tokio::test]
    async fn decrement_to_zero_deletes_entry() {
        let (store, user) = seeded_store().await;
        let ledger = ledger(&store);
        ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();
        ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();

        let left = ledger
            .decrement_item(user, CreditItemId::new(ITEM_A))
            .await
            .unwrap()
            .unwrap();
        assert_eq!((left.price, left.points, left.quantity), (100, 10, 1));

        let gone = ledger
            .decrement_item(user, CreditItemId::new(ITEM_A))
            .await
            .unwrap();
        assert!(gone.is_none());
        assert!(ledger.view_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decrement_without_entry_is_not_found() {
        let (store, user) = seeded_store().await;

        let err = ledger(&store)
            .decrement_item(user, CreditItemId::new(ITEM_A))
            .await
            .unwrap_err();

        assert_eq!(err, CartError::not_in_cart(CreditItemId::new(ITEM_A)));
    }

    #[tokio::test]
    async fn decrement_unknown_item_is_not_found() {
        let (store, user) = seeded_store().await;

        let err = ledger(&store)
            .decrement_item(user, CreditItemId::new(42))
            .await
            .unwrap_err();

        assert_eq!(err, CartError::item_not_found(CreditItemId::new(42)));
    }

    #[tokio::test]
    async fn remove_item_deletes_regardless_of_quantity() {
        let (store, user) = seeded_store().await;
        let ledger = ledger(&store);
        ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();
        let entry = ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();

        ledger.remove_item(user, entry.id).await.unwrap();

        assert!(ledger.view_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_item_of_another_user_is_forbidden() {
        let (store, owner) = seeded_store().await;
        let ledger = ledger(&store);
        let entry = ledger.add_item(owner, CreditItemId::new(ITEM_A)).await.unwrap();

        let err = ledger.remove_item(UserId::new(), entry.id).await.unwrap_err();

        assert_eq!(err, CartError::forbidden(entry.id));
        assert_eq!(ledger.view_cart(owner).await.unwrap().entries.len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_entry_is_not_found() {
        let (store, user) = seeded_store().await;
        let missing = CartEntryId::new();

        let err = ledger(&store).remove_item(user, missing).await.unwrap_err();

        assert_eq!(err, CartError::entry_not_found(missing));
    }

    #[tokio::test]
    async fn view_cart_sums_entries() {
        let (store, user) = seeded_store().await;
        let ledger = ledger(&store);
        ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();
        ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();
        ledger.add_item(user, CreditItemId::new(ITEM_B)).await.unwrap();

        let view = ledger.view_cart(user).await.unwrap();

        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.total_price, 450);
        assert_eq!(view.total_points, 50);
    }

    #[tokio::test]
    async fn empty_cart_view_is_zero() {
        let (store, user) = seeded_store().await;

        let view = ledger(&store).view_cart(user).await.unwrap();

        assert!(view.is_empty());
        assert_eq!((view.total_price, view.total_points), (0, 0));
    }

    #[tokio::test]
    async fn conflicts_are_retried() {
        let (store, user) = seeded_store().await;
        let ledger = ledger(&store);
        ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();

        store.inject_conflicts(3);
        let entry = ledger.add_item(user, CreditItemId::new(ITEM_A)).await.unwrap();

        assert_eq!(entry.quantity, 2);
    }

    #[tokio::test]
    async fn conflicts_beyond_budget_surface() {
        let (store, user) = seeded_store().await;
        let ledger = ledger(&store).with_max_attempts(2);

        store.inject_conflicts(2);
        let err = ledger
            .add_item(user, CreditItemId::new(ITEM_A))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::Conflict(_)));
        assert!(ledger.view_cart(user).await.unwrap().is_empty());
    }
}
