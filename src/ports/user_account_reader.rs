//! User account reader port.

use crate::domain::checkout::Customer;
use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

/// Read access to the user records owned by the account subsystem.
#[async_trait]
pub trait UserAccountReader: Send + Sync {
    /// Contact details for a charge. Returns `None` for unknown users.
    async fn find_customer(&self, user_id: &UserId) -> Result<Option<Customer>, DomainError>;
}
