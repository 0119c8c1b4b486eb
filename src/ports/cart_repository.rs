//! Cart repository port.
//!
//! Writes are guarded by optimistic versioning: callers pass the entry as
//! they last read it, and the store only applies the write if the stored
//! `version` still matches. A stale write fails with
//! `ErrorCode::ConcurrencyConflict` and changes nothing.
//!
//! ```ignore
//! let mut entry = repo.find_for_item(&user_id, &item.id).await?.ok_or(...)?;
//! entry.add_unit(&item)?;
//! match repo.update(&entry).await {
//!     Ok(saved) => saved,                      // version bumped
//!     Err(e) if e.is_conflict() => /* re-read and retry */,
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use crate::domain::cart::CartEntry;
use crate::domain::foundation::{CartEntryId, CreditItemId, DomainError, UserId};
use async_trait::async_trait;

/// Repository port for cart entries.
///
/// Implementations must ensure:
/// - At most one entry per (user, credit item)
/// - `update` and `delete` only succeed against the expected version
/// - Every successful write bumps `version`
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find the user's entry for a credit item.
    async fn find_for_item(
        &self,
        user_id: &UserId,
        credit_item_id: &CreditItemId,
    ) -> Result<Option<CartEntry>, DomainError>;

    /// Find an entry by its own id, whoever owns it.
    async fn find_by_id(&self, id: &CartEntryId) -> Result<Option<CartEntry>, DomainError>;

    /// All of the user's entries, oldest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<CartEntry>, DomainError>;

    /// Insert a new entry and return it as stored.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the user already has an entry for the item
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, entry: &CartEntry) -> Result<CartEntry, DomainError>;

    /// Overwrite quantity and totals if `entry.version` is still current.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the entry changed or disappeared
    /// - `DatabaseError` on persistence failure
    async fn update(&self, entry: &CartEntry) -> Result<CartEntry, DomainError>;

    /// Delete the entry if `entry.version` is still current.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the entry changed or disappeared
    /// - `DatabaseError` on persistence failure
    async fn delete(&self, entry: &CartEntry) -> Result<(), DomainError>;
}
