//! Credit catalog port (read-only).

use crate::domain::catalog::CreditItem;
use crate::domain::foundation::{CreditItemId, DomainError};
use async_trait::async_trait;

/// Read access to the purchasable credit items.
#[async_trait]
pub trait CreditCatalog: Send + Sync {
    /// Find a credit item by id. Returns `None` if it does not exist.
    async fn find_by_id(&self, id: &CreditItemId) -> Result<Option<CreditItem>, DomainError>;

    /// All credit items, ordered by id.
    async fn list_all(&self) -> Result<Vec<CreditItem>, DomainError>;
}
