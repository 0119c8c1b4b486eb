//! LoginUserHandler - Exchanges email and password for a session token.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::account::{normalize_email, AccountError};
use crate::domain::foundation::UserId;
use crate::ports::{PasswordHasher, TokenIssuer, UserAccountRepository};

use super::verify_password;

#[derive(Debug, Clone)]
pub struct LoginUserCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginUserResult {
    pub user_id: UserId,
    pub name: String,
    pub token: String,
}

pub struct LoginUserHandler {
    accounts: Arc<dyn UserAccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl LoginUserHandler {
    pub fn new(
        accounts: Arc<dyn UserAccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
        }
    }

    /// # Errors
    ///
    /// - `NotFound` for an unknown email
    /// - `WrongPassword` when the password does not match, or the account
    ///   has no password set
    pub async fn handle(&self, cmd: LoginUserCommand) -> Result<LoginUserResult, AccountError> {
        let email = normalize_email(&cmd.email);
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AccountError::not_found(email.clone()))?;

        if account.password_hash.is_empty() {
            return Err(AccountError::WrongPassword);
        }
        let matches =
            verify_password(&self.hasher, cmd.password, account.password_hash.clone()).await?;
        if !matches {
            tracing::debug!(user_id = %account.id, "Login with wrong password");
            return Err(AccountError::WrongPassword);
        }

        let token = self.tokens.issue(&account.id).map_err(|e| {
            tracing::error!(user_id = %account.id, error = %e, "Could not issue session token");
            AccountError::storage(e.to_string())
        })?;

        Ok(LoginUserResult {
            user_id: account.id,
            name: account.name,
            token,
        })
    }
}
