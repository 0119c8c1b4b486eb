//! Password hashing port.
//!
//! Hashing is CPU-bound; callers run it off the async executor.

use crate::domain::foundation::DomainError;

pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing string (algorithm, salt, hash).
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Check a password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored
    /// hash cannot be read.
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, DomainError>;
}
