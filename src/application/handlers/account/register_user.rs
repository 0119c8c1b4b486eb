//! RegisterUserHandler - Command handler for signing up.

use std::sync::Arc;

use crate::domain::account::{AccountError, Registration, UserAccount};
use crate::ports::{PasswordHasher, UserAccountRepository};

use super::hash_password;

/// Command to create an account.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct RegisterUserHandler {
    accounts: Arc<dyn UserAccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegisterUserHandler {
    pub fn new(accounts: Arc<dyn UserAccountRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { accounts, hasher }
    }

    /// Validates the form, hashes the password and stores the account.
    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<UserAccount, AccountError> {
        let registration = Registration::new(
            &cmd.name,
            &cmd.email,
            &cmd.phone,
            &cmd.password,
            &cmd.confirm_password,
        )?;

        let password_hash = hash_password(&self.hasher, registration.password.clone()).await?;
        let account = registration.into_account(password_hash);
        self.accounts.create(&account).await?;

        tracing::info!(user_id = %account.id, "Account registered");
        Ok(account)
    }
}
