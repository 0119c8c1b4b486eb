//! PostgreSQL implementation of CreditCatalog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::catalog::CreditItem;
use crate::domain::foundation::{CreditItemId, DomainError};
use crate::ports::CreditCatalog;

pub struct PostgresCreditCatalog {
    pool: PgPool,
}

impl PostgresCreditCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CreditItemRow {
    id: i64,
    price: i64,
    points: i64,
}

impl From<CreditItemRow> for CreditItem {
    fn from(row: CreditItemRow) -> Self {
        CreditItem::new(CreditItemId::new(row.id), row.price, row.points)
    }
}

#[async_trait]
impl CreditCatalog for PostgresCreditCatalog {
    async fn find_by_id(&self, id: &CreditItemId) -> Result<Option<CreditItem>, DomainError> {
        let row: Option<CreditItemRow> =
            sqlx::query_as("SELECT id, price, points FROM credit_items WHERE id = $1")
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to load credit item: {}", e)))?;

        Ok(row.map(CreditItem::from))
    }

    async fn list_all(&self) -> Result<Vec<CreditItem>, DomainError> {
        let rows: Vec<CreditItemRow> =
            sqlx::query_as("SELECT id, price, points FROM credit_items ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to list credit items: {}", e)))?;

        Ok(rows.into_iter().map(CreditItem::from).collect())
    }
}
