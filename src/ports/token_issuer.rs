//! Session token issuing port.
//!
//! The counterpart of [`SessionValidator`](super::SessionValidator): tokens
//! issued here are accepted by the validator of the same adapter.

use crate::domain::foundation::{AuthError, UserId};

pub trait TokenIssuer: Send + Sync {
    /// Issue a session token for the user.
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError>;
}
