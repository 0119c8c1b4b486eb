//! In-memory credit store.
//!
//! Implements every store port over one shared state so that settlement can
//! be applied atomically: the settlement is worked out against a copy of the
//! state and swapped in only when every step succeeded.
//!
//! Useful for tests and local development. Supports fault injection for the
//! conflict, atomicity and settlement recovery paths.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::UserAccount;
use crate::domain::cart::CartEntry;
use crate::domain::catalog::CreditItem;
use crate::domain::checkout::{reconcile, CartAdjustment, Customer, Settlement, TransactionHistory};
use crate::domain::foundation::{
    CartEntryId, CreditItemId, DomainError, ErrorCode, Timestamp, UserId,
};
use crate::ports::{
    CartRepository, CreditCatalog, PendingSettlement, SettlementOutcome, SettlementStore,
    TransactionHistoryReader, UserAccountReader, UserAccountRepository,
};

#[derive(Debug, Clone)]
struct UserRecord {
    account: UserAccount,
    point: i64,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<UserId, UserRecord>,
    items: BTreeMap<CreditItemId, CreditItem>,
    entries: HashMap<CartEntryId, CartEntry>,
    histories: Vec<TransactionHistory>,
    pending: HashMap<UserId, PendingSettlement>,
}

impl StoreState {
    fn entries_for(&self, user_id: &UserId) -> Vec<CartEntry> {
        let mut entries: Vec<CartEntry> = self
            .entries
            .values()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        entries
    }

    fn user_not_found(user_id: &UserId) -> DomainError {
        DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", user_id))
    }

    fn stale(entry: &CartEntry) -> DomainError {
        DomainError::conflict(format!(
            "Cart entry {} changed since version {}",
            entry.id, entry.version
        ))
    }
}

/// In-memory implementation of the store ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCreditStore {
    state: Arc<RwLock<StoreState>>,
    pending_conflicts: Arc<AtomicU32>,
    failing_settlements: Arc<AtomicU32>,
}

impl InMemoryCreditStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a catalog item.
    pub async fn add_credit_item(&self, item: CreditItem) {
        self.state.write().await.items.insert(item.id, item);
    }

    /// Add a user account with a starting point balance and no password.
    pub async fn add_user(&self, user_id: UserId, customer: Customer, point: i64) {
        let account = UserAccount {
            id: user_id,
            name: customer.first_name,
            email: customer.email,
            phone: customer.phone,
            password_hash: String::new(),
            created_at: Timestamp::now(),
        };
        self.state
            .write()
            .await
            .users
            .insert(user_id, UserRecord { account, point });
    }

    /// The user's loyalty balance, if the user exists.
    pub async fn point_balance(&self, user_id: &UserId) -> Option<i64> {
        self.state.read().await.users.get(user_id).map(|u| u.point)
    }

    /// Number of history rows across all users.
    pub async fn history_count(&self) -> usize {
        self.state.read().await.histories.len()
    }

    /// Make the next `count` cart writes fail with a version conflict.
    pub fn inject_conflicts(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` settlements fail after all of their steps were
    /// applied to the working copy, just before commit.
    pub fn fail_settlements(&self, count: u32) {
        self.failing_settlements.store(count, Ordering::SeqCst);
    }

    /// The user's charged-but-unsettled order id, if any.
    pub async fn pending_order(&self, user_id: &UserId) -> Option<String> {
        self.state
            .read()
            .await
            .pending
            .get(user_id)
            .map(|p| p.settlement.order_id.to_string())
    }

    fn take_injected_conflict(&self) -> bool {
        take_one(&self.pending_conflicts)
    }

    fn injected_conflict(&self, entry: &CartEntry) -> Result<(), DomainError> {
        if self.take_injected_conflict() {
            Err(StoreState::stale(entry))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CreditCatalog for InMemoryCreditStore {
    async fn find_by_id(&self, id: &CreditItemId) -> Result<Option<CreditItem>, DomainError> {
        Ok(self.state.read().await.items.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<CreditItem>, DomainError> {
        Ok(self.state.read().await.items.values().cloned().collect())
    }
}

#[async_trait]
impl CartRepository for InMemoryCreditStore {
    async fn find_for_item(
        &self,
        user_id: &UserId,
        credit_item_id: &CreditItemId,
    ) -> Result<Option<CartEntry>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .values()
            .find(|e| &e.user_id == user_id && &e.credit_item_id == credit_item_id)
            .cloned())
    }

    async fn find_by_id(&self, id: &CartEntryId) -> Result<Option<CartEntry>, DomainError> {
        Ok(self.state.read().await.entries.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CartEntry>, DomainError> {
        Ok(self.state.read().await.entries_for(user_id))
    }

    async fn insert(&self, entry: &CartEntry) -> Result<CartEntry, DomainError> {
        self.injected_conflict(entry)?;
        let mut state = self.state.write().await;

        let duplicate = state
            .entries
            .values()
            .any(|e| e.user_id == entry.user_id && e.credit_item_id == entry.credit_item_id);
        if duplicate {
            return Err(DomainError::conflict(format!(
                "User already has a cart entry for credit item {}",
                entry.credit_item_id
            )));
        }

        let mut stored = entry.clone();
        stored.version = 1;
        state.entries.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, entry: &CartEntry) -> Result<CartEntry, DomainError> {
        self.injected_conflict(entry)?;
        let mut state = self.state.write().await;

        match state.entries.get_mut(&entry.id) {
            Some(current) if current.version == entry.version => {
                current.quantity = entry.quantity;
                current.price = entry.price;
                current.points = entry.points;
                current.version += 1;
                Ok(current.clone())
            }
            _ => Err(StoreState::stale(entry)),
        }
    }

    async fn delete(&self, entry: &CartEntry) -> Result<(), DomainError> {
        self.injected_conflict(entry)?;
        let mut state = self.state.write().await;

        let current_version = state.entries.get(&entry.id).map(|e| e.version);
        if current_version != Some(entry.version) {
            return Err(StoreState::stale(entry));
        }
        state.entries.remove(&entry.id);
        Ok(())
    }
}

#[async_trait]
impl UserAccountReader for InMemoryCreditStore {
    async fn find_customer(&self, user_id: &UserId) -> Result<Option<Customer>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(user_id)
            .map(|u| u.account.customer()))
    }
}

#[async_trait]
impl UserAccountRepository for InMemoryCreditStore {
    async fn create(&self, account: &UserAccount) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.account.email == account.email) {
            return Err(DomainError::new(
                ErrorCode::EmailTaken,
                format!("Email {} is already registered", account.email),
            )
            .with_detail("email", account.email.clone()));
        }

        state.users.insert(
            account.id,
            UserRecord {
                account: account.clone(),
                point: 0,
            },
        );
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.account.email == email)
            .map(|u| u.account.clone()))
    }

    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreState::user_not_found(user_id))?;
        user.account.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl SettlementStore for InMemoryCreditStore {
    async fn record_pending(&self, pending: &PendingSettlement) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let user_id = *pending.user_id();

        if let Some(existing) = state.pending.get(&user_id) {
            if existing.settlement.order_id == pending.settlement.order_id {
                return Ok(());
            }
            return Err(DomainError::conflict(format!(
                "User {} already has order {} awaiting settlement",
                user_id, existing.settlement.order_id
            )));
        }
        state.pending.insert(user_id, pending.clone());
        Ok(())
    }

    async fn pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PendingSettlement>, DomainError> {
        Ok(self.state.read().await.pending.get(user_id).cloned())
    }

    async fn settle(&self, settlement: &Settlement) -> Result<SettlementOutcome, DomainError> {
        let mut state = self.state.write().await;

        if let Some(history) = state
            .histories
            .iter()
            .find(|h| h.order_id == settlement.order_id)
            .cloned()
        {
            let point_balance = state
                .users
                .get(&settlement.user_id)
                .map(|u| u.point)
                .ok_or_else(|| StoreState::user_not_found(&settlement.user_id))?;
            clear_pending(&mut state, settlement);
            return Ok(SettlementOutcome {
                history,
                point_balance,
                remaining: state.entries_for(&settlement.user_id),
            });
        }

        let mut working = state.clone();

        let user = working
            .users
            .get_mut(&settlement.user_id)
            .ok_or_else(|| StoreState::user_not_found(&settlement.user_id))?;
        user.point = user
            .point
            .checked_add(settlement.total_points)
            .ok_or_else(|| {
                DomainError::database(format!(
                    "Point balance of user {} would overflow",
                    settlement.user_id
                ))
            })?;
        let point_balance = user.point;

        let live = working.entries_for(&settlement.user_id);
        for adjustment in reconcile(&live, &settlement.snapshot) {
            match adjustment {
                CartAdjustment::Delete(id) => {
                    working.entries.remove(&id);
                }
                CartAdjustment::Reduce(mut remaining) => {
                    remaining.version += 1;
                    working.entries.insert(remaining.id, remaining);
                }
            }
        }

        let history = settlement.history_record();
        working.histories.push(history.clone());
        clear_pending(&mut working, settlement);

        if take_one(&self.failing_settlements) {
            return Err(DomainError::database("Simulated commit failure"));
        }

        let remaining = working.entries_for(&settlement.user_id);
        *state = working;

        Ok(SettlementOutcome {
            history,
            point_balance,
            remaining,
        })
    }
}

fn clear_pending(state: &mut StoreState, settlement: &Settlement) {
    let matches = state
        .pending
        .get(&settlement.user_id)
        .is_some_and(|p| p.settlement.order_id == settlement.order_id);
    if matches {
        state.pending.remove(&settlement.user_id);
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl TransactionHistoryReader for InMemoryCreditStore {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TransactionHistory>, DomainError> {
        let state = self.state.read().await;
        let mut rows: Vec<TransactionHistory> = state
            .histories
            .iter()
            .rev()
            .filter(|h| &h.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartView;
    use crate::domain::checkout::OrderId;
    use crate::ports::{ChargeResult, ChargeStatus};

    fn item() -> CreditItem {
        CreditItem::new(CreditItemId::new(1), 100, 10)
    }

    fn charge(order_id: &str) -> ChargeResult {
        ChargeResult {
            order_id: OrderId::new(order_id),
            transaction_id: format!("tx-{}", order_id),
            status: ChargeStatus::Settlement,
            actions: Vec::new(),
        }
    }

    fn account(email: &str) -> UserAccount {
        UserAccount {
            id: UserId::new(),
            name: "Sari".to_string(),
            email: email.to_string(),
            phone: "0812".to_string(),
            password_hash: "hash".to_string(),
            created_at: Timestamp::now(),
        }
    }

    async fn store_with_user() -> (InMemoryCreditStore, UserId) {
        let store = InMemoryCreditStore::new();
        store.add_credit_item(item()).await;
        let user = UserId::new();
        store
            .add_user(user, Customer::new("Budi", "budi@example.com", "0812"), 5)
            .await;
        (store, user)
    }

    #[tokio::test]
    async fn catalog_lists_items_by_id() {
        let store = InMemoryCreditStore::new();
        store
            .add_credit_item(CreditItem::new(CreditItemId::new(3), 1, 1))
            .await;
        store
            .add_credit_item(CreditItem::new(CreditItemId::new(1), 1, 1))
            .await;

        let ids: Vec<i64> = store
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|i| i.id.value())
            .collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn insert_rejects_second_entry_for_same_item() {
        let (store, user) = store_with_user().await;
        store.insert(&CartEntry::open(user, &item())).await.unwrap();

        let err = store
            .insert(&CartEntry::open(user, &item()))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn stale_update_is_a_conflict() {
        let (store, user) = store_with_user().await;
        let stored = store.insert(&CartEntry::open(user, &item())).await.unwrap();

        let mut first = stored.clone();
        first.add_unit(&item()).unwrap();
        store.update(&first).await.unwrap();

        let mut second = stored;
        second.add_unit(&item()).unwrap();
        let err = store.update(&second).await.unwrap_err();

        assert!(err.is_conflict());
        let current = store.find_for_item(&user, &item().id).await.unwrap().unwrap();
        assert_eq!(current.quantity, 2);
        assert_eq!(current.version, 2);
    }

    #[tokio::test]
    async fn stale_delete_is_a_conflict() {
        let (store, user) = store_with_user().await;
        let stored = store.insert(&CartEntry::open(user, &item())).await.unwrap();
        let mut bumped = stored.clone();
        bumped.add_unit(&item()).unwrap();
        store.update(&bumped).await.unwrap();

        assert!(store.delete(&stored).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn settle_applies_all_three_mutations() {
        let (store, user) = store_with_user().await;
        store.insert(&CartEntry::open(user, &item())).await.unwrap();
        let entries = CartRepository::list_for_user(&store, &user).await.unwrap();
        let cart = CartView::from_entries(entries).unwrap();

        let outcome = store
            .settle(&Settlement::from_cart(user, OrderId::new("CS-1"), &cart))
            .await
            .unwrap();

        assert_eq!(outcome.point_balance, 15);
        assert!(outcome.remaining.is_empty());
        assert_eq!(store.point_balance(&user).await, Some(15));
        let histories = TransactionHistoryReader::list_for_user(&store, &user)
            .await
            .unwrap();
        assert_eq!(histories.len(), 1);
        assert!(CartRepository::list_for_user(&store, &user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_settlement_leaves_nothing_behind() {
        let (store, user) = store_with_user().await;
        store.insert(&CartEntry::open(user, &item())).await.unwrap();
        let entries = CartRepository::list_for_user(&store, &user).await.unwrap();
        let cart = CartView::from_entries(entries).unwrap();

        let settlement = Settlement::from_cart(user, OrderId::new("CS-1"), &cart);
        store
            .record_pending(&PendingSettlement::new(settlement.clone(), charge("CS-1")))
            .await
            .unwrap();

        store.fail_settlements(1);
        let err = store.settle(&settlement).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(store.point_balance(&user).await, Some(5));
        assert_eq!(store.history_count().await, 0);
        let entries = CartRepository::list_for_user(&store, &user).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.pending_order(&user).await.as_deref(), Some("CS-1"));
    }

    #[tokio::test]
    async fn settling_same_order_twice_returns_first_outcome() {
        let (store, user) = store_with_user().await;
        store.insert(&CartEntry::open(user, &item())).await.unwrap();
        let entries = CartRepository::list_for_user(&store, &user).await.unwrap();
        let cart = CartView::from_entries(entries).unwrap();
        let settlement = Settlement::from_cart(user, OrderId::new("CS-1"), &cart);
        let first = store.settle(&settlement).await.unwrap();

        let second = store.settle(&settlement).await.unwrap();

        assert_eq!(second, first);
        assert_eq!(store.point_balance(&user).await, Some(15));
        assert_eq!(store.history_count().await, 1);
    }

    #[tokio::test]
    async fn settle_clears_the_pending_record() {
        let (store, user) = store_with_user().await;
        store.insert(&CartEntry::open(user, &item())).await.unwrap();
        let entries = CartRepository::list_for_user(&store, &user).await.unwrap();
        let cart = CartView::from_entries(entries).unwrap();
        let settlement = Settlement::from_cart(user, OrderId::new("CS-1"), &cart);
        let pending = PendingSettlement::new(settlement.clone(), charge("CS-1"));
        store.record_pending(&pending).await.unwrap();

        assert_eq!(store.pending_for_user(&user).await.unwrap(), Some(pending));
        store.settle(&settlement).await.unwrap();

        assert_eq!(store.pending_for_user(&user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_pending_order_for_user_conflicts() {
        let (store, user) = store_with_user().await;
        let first = Settlement::from_cart(user, OrderId::new("CS-1"), &CartView::empty());
        let second = Settlement::from_cart(user, OrderId::new("CS-2"), &CartView::empty());
        store
            .record_pending(&PendingSettlement::new(first.clone(), charge("CS-1")))
            .await
            .unwrap();

        store
            .record_pending(&PendingSettlement::new(first, charge("CS-1")))
            .await
            .unwrap();
        let err = store
            .record_pending(&PendingSettlement::new(second, charge("CS-2")))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.pending_order(&user).await.as_deref(), Some("CS-1"));
    }

    #[tokio::test]
    async fn point_overflow_fails_settlement() {
        let store = InMemoryCreditStore::new();
        store.add_credit_item(item()).await;
        let user = UserId::new();
        store
            .add_user(user, Customer::new("Budi", "budi@example.com", "0812"), i64::MAX - 1)
            .await;
        store.insert(&CartEntry::open(user, &item())).await.unwrap();
        let entries = CartRepository::list_for_user(&store, &user).await.unwrap();
        let cart = CartView::from_entries(entries).unwrap();

        let err = store
            .settle(&Settlement::from_cart(user, OrderId::new("CS-1"), &cart))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(store.point_balance(&user).await, Some(i64::MAX - 1));
        assert_eq!(store.history_count().await, 0);
    }

    #[tokio::test]
    async fn accounts_are_unique_by_email() {
        let store = InMemoryCreditStore::new();
        let first = account("sari@example.com");
        store.create(&first).await.unwrap();

        let err = store.create(&account("sari@example.com")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::EmailTaken);
        let found = store.find_by_email("sari@example.com").await.unwrap();
        assert_eq!(found, Some(first.clone()));
        assert_eq!(store.point_balance(&first.id).await, Some(0));
    }

    #[tokio::test]
    async fn password_update_replaces_hash() {
        let store = InMemoryCreditStore::new();
        let account = account("sari@example.com");
        store.create(&account).await.unwrap();

        store.update_password(&account.id, "new-hash").await.unwrap();

        let found = store.find_by_email("sari@example.com").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new-hash");
        let err = store.update_password(&UserId::new(), "x").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn settle_for_unknown_user_fails() {
        let store = InMemoryCreditStore::new();
        let settlement =
            Settlement::from_cart(UserId::new(), OrderId::new("CS-1"), &CartView::empty());

        let err = store.settle(&settlement).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn injected_conflicts_are_consumed() {
        let (store, user) = store_with_user().await;
        store.inject_conflicts(1);

        assert!(store
            .insert(&CartEntry::open(user, &item()))
            .await
            .unwrap_err()
            .is_conflict());
        assert!(store.insert(&CartEntry::open(user, &item())).await.is_ok());
    }
}
