//! PostgreSQL implementation of TransactionHistoryReader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::checkout::{OrderId, TransactionHistory};
use crate::domain::foundation::{DomainError, Timestamp, TransactionHistoryId, UserId};
use crate::ports::TransactionHistoryReader;

pub struct PostgresTransactionHistoryReader {
    pool: PgPool,
}

impl PostgresTransactionHistoryReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) const HISTORY_COLUMNS: &str = "id, user_id, order_id, price, points, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TransactionHistoryRow {
    id: Uuid,
    user_id: Uuid,
    order_id: String,
    price: i64,
    points: i64,
    created_at: DateTime<Utc>,
}

impl From<TransactionHistoryRow> for TransactionHistory {
    fn from(row: TransactionHistoryRow) -> Self {
        TransactionHistory {
            id: TransactionHistoryId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            order_id: OrderId::new(row.order_id),
            price: row.price,
            points: row.points,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl TransactionHistoryReader for PostgresTransactionHistoryReader {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<TransactionHistory>, DomainError> {
        let rows: Vec<TransactionHistoryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM transaction_histories
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
            HISTORY_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list history: {}", e)))?;

        Ok(rows.into_iter().map(TransactionHistory::from).collect())
    }
}
