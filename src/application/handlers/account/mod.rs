//! Account handlers: registration, login and password reset.

mod login_user;
mod register_user;
mod reset_password;

pub use login_user::{LoginUserCommand, LoginUserHandler, LoginUserResult};
pub use register_user::{RegisterUserCommand, RegisterUserHandler};
pub use reset_password::{ResetPasswordCommand, ResetPasswordHandler};

use std::sync::Arc;

use crate::domain::account::AccountError;
use crate::ports::PasswordHasher;

/// Hashes on the blocking pool; argon2 takes tens of milliseconds.
async fn hash_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: String,
) -> Result<String, AccountError> {
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AccountError::storage(e.to_string()))?
        .map_err(AccountError::from)
}

async fn verify_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: String,
    password_hash: String,
) -> Result<bool, AccountError> {
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
        .await
        .map_err(|e| AccountError::storage(e.to_string()))?
        .map_err(AccountError::from)
}
