//! Ownership trait for user-owned records.
//!
//! Cart entries are addressed by their own id on removal, so the caller's
//! identity has to be checked against the stored owner before anything is
//! deleted.
//!
//! ```ignore
//! let entry = repo.find_by_id(entry_id).await?.ok_or(...)?;
//! entry.check_ownership(&user.id)?;  // Err(Forbidden) for anyone else
//! ```

use super::{DomainError, ErrorCode, UserId};

/// Trait for records that have a single owning user.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this record.
    fn owner_id(&self) -> &UserId;

    /// Checks if the given user is the owner.
    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Validates ownership, returning a `Forbidden` error otherwise.
    fn check_ownership(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User does not own this resource",
            )
            .with_detail("owner_id", self.owner_id().to_string())
            .with_detail("requested_by", user_id.to_string()))
        }
    }
}
