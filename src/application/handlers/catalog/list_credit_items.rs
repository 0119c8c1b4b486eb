//! ListCreditItemsHandler - Query handler for the credit item catalog.

use std::sync::Arc;

use crate::domain::catalog::CreditItem;
use crate::domain::foundation::DomainError;
use crate::ports::CreditCatalog;

pub struct ListCreditItemsHandler {
    catalog: Arc<dyn CreditCatalog>,
}

impl ListCreditItemsHandler {
    pub fn new(catalog: Arc<dyn CreditCatalog>) -> Self {
        Self { catalog }
    }

    /// Every purchasable credit item, ordered by id.
    pub async fn handle(&self) -> Result<Vec<CreditItem>, DomainError> {
        self.catalog.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CreditItemId, ErrorCode};
    use async_trait::async_trait;

    struct FixedCatalog {
        items: Vec<CreditItem>,
        fail: bool,
    }

    #[async_trait]
    impl CreditCatalog for FixedCatalog {
        async fn find_by_id(&self, id: &CreditItemId) -> Result<Option<CreditItem>, DomainError> {
            Ok(self.items.iter().find(|i| &i.id == id).cloned())
        }

        async fn list_all(&self) -> Result<Vec<CreditItem>, DomainError> {
            if self.fail {
                return Err(DomainError::database("Simulated catalog failure"));
            }
            Ok(self.items.clone())
        }
    }

    #[tokio::test]
    async fn returns_catalog_items() {
        let items = vec![
            CreditItem::new(CreditItemId::new(1), 10_000, 100),
            CreditItem::new(CreditItemId::new(2), 45_000, 500),
        ];
        let handler = ListCreditItemsHandler::new(Arc::new(FixedCatalog {
            items: items.clone(),
            fail: false,
        }));

        assert_eq!(handler.handle().await.unwrap(), items);
    }

    #[tokio::test]
    async fn propagates_store_errors() {
        let handler = ListCreditItemsHandler::new(Arc::new(FixedCatalog {
            items: vec![],
            fail: true,
        }));

        let err = handler.handle().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
