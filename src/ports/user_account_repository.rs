//! User account repository port.
//!
//! Registration, login and password reset read and write the same `users`
//! rows that checkout reads through [`UserAccountReader`](super::UserAccountReader).

use crate::domain::account::UserAccount;
use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait UserAccountRepository: Send + Sync {
    /// Store a new account with a zero point balance.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if another account uses the email
    /// - `DatabaseError` on storage failure
    async fn create(&self, account: &UserAccount) -> Result<(), DomainError>;

    /// Look up an account by its (normalised) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError>;

    /// Replace the stored password hash.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if no account has this id
    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
    ) -> Result<(), DomainError>;
}
