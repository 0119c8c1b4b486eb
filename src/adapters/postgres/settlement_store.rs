//! PostgreSQL implementation of SettlementStore.
//!
//! A settlement is one transaction: the user row and the user's cart rows are
//! locked with `FOR UPDATE`, the paid-for units are removed, the points are
//! awarded, the history row is inserted and the pending record is deleted.
//! Any failure rolls all of it back when the transaction is dropped
//! uncommitted.
//!
//! Pending records are stored as JSONB in `pending_settlements`, one per
//! user at most.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::cart::CartEntry;
use crate::domain::checkout::{reconcile, CartAdjustment, OrderId, Settlement, TransactionHistory};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{PendingSettlement, SettlementOutcome, SettlementStore};

use super::cart_repository::{CartEntryRow, ENTRY_COLUMNS};
use super::transaction_history::{TransactionHistoryRow, HISTORY_COLUMNS};
use super::violated_constraint;

/// Unique order id constraint from the initial migration.
const ORDER_ID_CONSTRAINT: &str = "transaction_histories_order_id_key";

/// One pending settlement per user.
const PENDING_USER_CONSTRAINT: &str = "pending_settlements_user_id_key";

fn pending_error(
    constraint: Option<&str>,
    pending: &PendingSettlement,
    cause: impl std::fmt::Display,
) -> DomainError {
    if constraint == Some(PENDING_USER_CONSTRAINT) {
        return DomainError::conflict(format!(
            "User {} already has an order awaiting settlement",
            pending.user_id()
        ));
    }
    DomainError::database(format!(
        "Failed to record pending settlement {}: {}",
        pending.settlement.order_id, cause
    ))
}

fn history_error(
    constraint: Option<&str>,
    order_id: &OrderId,
    cause: impl std::fmt::Display,
) -> DomainError {
    if constraint == Some(ORDER_ID_CONSTRAINT) {
        return DomainError::database(format!("Order {} was already settled", order_id));
    }
    DomainError::database(format!("Failed to record history: {}", cause))
}

pub struct PostgresSettlementStore {
    pool: PgPool,
}

impl PostgresSettlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn locked_cart(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &UserId,
) -> Result<Vec<CartEntry>, DomainError> {
    let rows: Vec<CartEntryRow> = sqlx::query_as(&format!(
        "SELECT {} FROM cart_entries WHERE user_id = $1 ORDER BY created_at, id FOR UPDATE",
        ENTRY_COLUMNS
    ))
    .bind(user_id.as_uuid())
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| DomainError::database(format!("Failed to lock cart: {}", e)))?;

    Ok(rows.into_iter().map(CartEntry::from).collect())
}

async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    adjustment: &CartAdjustment,
) -> Result<(), DomainError> {
    match adjustment {
        CartAdjustment::Delete(id) => {
            sqlx::query("DELETE FROM cart_entries WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut **tx)
                .await
                .map_err(|e| DomainError::database(format!("Failed to clear cart entry: {}", e)))?;
        }
        CartAdjustment::Reduce(entry) => {
            sqlx::query(
                r#"
                UPDATE cart_entries SET
                    points = $2,
                    price = $3,
                    quantity = $4,
                    version = version + 1
                WHERE id = $1
                "#,
            )
            .bind(entry.id.as_uuid())
            .bind(entry.points)
            .bind(entry.price)
            .bind(entry.quantity)
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to reduce cart entry: {}", e)))?;
        }
    }
    Ok(())
}

async fn settled_history(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &OrderId,
) -> Result<Option<TransactionHistory>, DomainError> {
    let row: Option<TransactionHistoryRow> = sqlx::query_as(&format!(
        "SELECT {} FROM transaction_histories WHERE order_id = $1",
        HISTORY_COLUMNS
    ))
    .bind(order_id.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| DomainError::database(format!("Failed to look up order: {}", e)))?;

    Ok(row.map(TransactionHistory::from))
}

async fn clear_pending(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &OrderId,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM pending_settlements WHERE order_id = $1")
        .bind(order_id.as_str())
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to clear pending settlement: {}", e)))?;
    Ok(())
}

#[async_trait]
impl SettlementStore for PostgresSettlementStore {
    async fn record_pending(&self, pending: &PendingSettlement) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO pending_settlements (order_id, user_id, payload, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(pending.settlement.order_id.as_str())
        .bind(pending.user_id().as_uuid())
        .bind(Json(pending))
        .bind(pending.recorded_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| pending_error(violated_constraint(&e), pending, &e))?;
        Ok(())
    }

    async fn pending_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PendingSettlement>, DomainError> {
        let payload: Option<Json<PendingSettlement>> =
            sqlx::query_scalar("SELECT payload FROM pending_settlements WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to load pending settlement: {}", e))
                })?;

        Ok(payload.map(|Json(pending)| pending))
    }

    async fn settle(&self, settlement: &Settlement) -> Result<SettlementOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin settlement: {}", e)))?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT point FROM users WHERE id = $1 FOR UPDATE")
                .bind(settlement.user_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DomainError::database(format!("Failed to lock user: {}", e)))?;
        let Some(current_points) = locked else {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User {} not found", settlement.user_id),
            ));
        };

        if let Some(history) = settled_history(&mut tx, &settlement.order_id).await? {
            clear_pending(&mut tx, &settlement.order_id).await?;
            let remaining = locked_cart(&mut tx, &settlement.user_id).await?;
            tx.commit().await.map_err(|e| {
                DomainError::database(format!("Failed to commit settlement: {}", e))
            })?;
            tracing::debug!(
                user_id = %settlement.user_id,
                order_id = %settlement.order_id,
                "Order already settled"
            );
            return Ok(SettlementOutcome {
                history,
                point_balance: current_points,
                remaining,
            });
        }

        let live = locked_cart(&mut tx, &settlement.user_id).await?;
        for adjustment in reconcile(&live, &settlement.snapshot) {
            apply(&mut tx, &adjustment).await?;
        }

        let point_balance: i64 =
            sqlx::query_scalar("UPDATE users SET point = point + $2 WHERE id = $1 RETURNING point")
                .bind(settlement.user_id.as_uuid())
                .bind(settlement.total_points)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| DomainError::database(format!("Failed to award points: {}", e)))?;

        let history = settlement.history_record();
        sqlx::query(
            r#"
            INSERT INTO transaction_histories (id, user_id, order_id, price, points, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(history.id.as_uuid())
        .bind(history.user_id.as_uuid())
        .bind(history.order_id.as_str())
        .bind(history.price)
        .bind(history.points)
        .bind(history.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| history_error(violated_constraint(&e), &history.order_id, &e))?;

        clear_pending(&mut tx, &settlement.order_id).await?;
        let remaining = locked_cart(&mut tx, &settlement.user_id).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit settlement: {}", e)))?;

        tracing::debug!(
            user_id = %settlement.user_id,
            order_id = %settlement.order_id,
            point_balance,
            "Settlement committed"
        );

        Ok(SettlementOutcome {
            history,
            point_balance,
            remaining,
        })
    }
}
