//! PostgreSQL implementation of CartRepository.
//!
//! Every write is conditional on the `version` the caller read; a write that
//! matches no row is reported as a concurrency conflict so the ledger can
//! re-read and retry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::CartEntry;
use crate::domain::foundation::{
    CartEntryId, CreditItemId, DomainError, Timestamp, UserId,
};
use crate::ports::CartRepository;

use super::violated_constraint;

/// Unique (user_id, credit_item_id) constraint from the initial migration.
const USER_ITEM_CONSTRAINT: &str = "cart_entries_user_item_key";

pub(super) const ENTRY_COLUMNS: &str =
    "id, user_id, credit_item_id, points, price, quantity, version, created_at";

pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a cart entry.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct CartEntryRow {
    id: Uuid,
    user_id: Uuid,
    credit_item_id: i64,
    points: i64,
    price: i64,
    quantity: i64,
    version: i64,
    created_at: DateTime<Utc>,
}

impl From<CartEntryRow> for CartEntry {
    fn from(row: CartEntryRow) -> Self {
        CartEntry {
            id: CartEntryId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            credit_item_id: CreditItemId::new(row.credit_item_id),
            points: row.points,
            price: row.price,
            quantity: row.quantity,
            version: row.version,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

/// A duplicate (user, item) pair means another request created the entry
/// first; the ledger re-reads and retries.
fn insert_error(
    constraint: Option<&str>,
    credit_item_id: CreditItemId,
    cause: impl std::fmt::Display,
) -> DomainError {
    if constraint == Some(USER_ITEM_CONSTRAINT) {
        return DomainError::conflict(format!(
            "Credit item {} is already in the cart",
            credit_item_id
        ));
    }
    DomainError::database(format!("Failed to insert cart entry: {}", cause))
}

fn stale(entry: &CartEntry) -> DomainError {
    DomainError::conflict(format!(
        "Cart entry {} changed since version {}",
        entry.id, entry.version
    ))
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_for_item(
        &self,
        user_id: &UserId,
        credit_item_id: &CreditItemId,
    ) -> Result<Option<CartEntry>, DomainError> {
        let row: Option<CartEntryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cart_entries WHERE user_id = $1 AND credit_item_id = $2",
            ENTRY_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(credit_item_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load cart entry: {}", e)))?;

        Ok(row.map(CartEntry::from))
    }

    async fn find_by_id(&self, id: &CartEntryId) -> Result<Option<CartEntry>, DomainError> {
        let row: Option<CartEntryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cart_entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load cart entry: {}", e)))?;

        Ok(row.map(CartEntry::from))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CartEntry>, DomainError> {
        let rows: Vec<CartEntryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cart_entries WHERE user_id = $1 ORDER BY created_at, id",
            ENTRY_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list cart: {}", e)))?;

        Ok(rows.into_iter().map(CartEntry::from).collect())
    }

    async fn insert(&self, entry: &CartEntry) -> Result<CartEntry, DomainError> {
        let row: CartEntryRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO cart_entries (
                id, user_id, credit_item_id, points, price, quantity, version, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 1, $7)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id.as_uuid())
        .bind(entry.user_id.as_uuid())
        .bind(entry.credit_item_id.value())
        .bind(entry.points)
        .bind(entry.price)
        .bind(entry.quantity)
        .bind(entry.created_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(violated_constraint(&e), entry.credit_item_id, &e))?;

        Ok(row.into())
    }

    async fn update(&self, entry: &CartEntry) -> Result<CartEntry, DomainError> {
        let row: Option<CartEntryRow> = sqlx::query_as(&format!(
            r#"
            UPDATE cart_entries SET
                points = $3,
                price = $4,
                quantity = $5,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id.as_uuid())
        .bind(entry.version)
        .bind(entry.points)
        .bind(entry.price)
        .bind(entry.quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update cart entry: {}", e)))?;

        row.map(CartEntry::from).ok_or_else(|| stale(entry))
    }

    async fn delete(&self, entry: &CartEntry) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE id = $1 AND version = $2")
            .bind(entry.id.as_uuid())
            .bind(entry.version)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete cart entry: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(stale(entry));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use chrono::TimeZone;

    #[test]
    fn duplicate_user_item_is_a_conflict() {
        let err = insert_error(Some(USER_ITEM_CONSTRAINT), CreditItemId::new(7), "duplicate key");

        assert!(err.is_conflict());
        assert!(err.message.contains("Credit item 7"));
    }

    #[test]
    fn other_insert_failures_are_database_errors() {
        let err = insert_error(Some("cart_entries_credit_item_id_fkey"), CreditItemId::new(7), "fk");
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let err = insert_error(None, CreditItemId::new(7), "connection reset");
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("connection reset"));
    }

    #[test]
    fn row_maps_every_column() {
        let id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

        let entry = CartEntry::from(CartEntryRow {
            id,
            user_id,
            credit_item_id: 3,
            points: 20,
            price: 200,
            quantity: 2,
            version: 4,
            created_at,
        });

        assert_eq!(entry.id, CartEntryId::from_uuid(id));
        assert_eq!(entry.user_id, UserId::from_uuid(user_id));
        assert_eq!(entry.credit_item_id, CreditItemId::new(3));
        assert_eq!((entry.points, entry.price, entry.quantity), (20, 200, 2));
        assert_eq!(entry.version, 4);
        assert_eq!(entry.created_at, Timestamp::from_datetime(created_at));
    }
}
