//! ResetPasswordHandler - Replaces the signed-in user's password.

use std::sync::Arc;

use crate::domain::account::{validate_password, AccountError};
use crate::domain::foundation::UserId;
use crate::ports::{PasswordHasher, UserAccountRepository};

use super::hash_password;

#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
    pub user_id: UserId,
    pub password: String,
}

pub struct ResetPasswordHandler {
    accounts: Arc<dyn UserAccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ResetPasswordHandler {
    pub fn new(accounts: Arc<dyn UserAccountRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { accounts, hasher }
    }

    pub async fn handle(&self, cmd: ResetPasswordCommand) -> Result<(), AccountError> {
        validate_password(&cmd.password)?;
        let password_hash = hash_password(&self.hasher, cmd.password).await?;
        self.accounts
            .update_password(&cmd.user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %cmd.user_id, "Password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::account::test_support::accounts;
    use crate::application::handlers::account::{
        LoginUserCommand, LoginUserHandler, RegisterUserCommand, RegisterUserHandler,
    };

    #[tokio::test]
    async fn new_password_replaces_old_one() {
        let a = accounts();
        let account = RegisterUserHandler::new(a.store.clone(), a.hasher.clone())
            .handle(RegisterUserCommand {
                name: "Sari".to_string(),
                email: "sari@example.com".to_string(),
                phone: String::new(),
                password: "hunter22!".to_string(),
                confirm_password: "hunter22!".to_string(),
            })
            .await
            .unwrap();
        let handler = ResetPasswordHandler::new(a.store.clone(), a.hasher.clone());

        handler
            .handle(ResetPasswordCommand {
                user_id: account.id,
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();

        let login = LoginUserHandler::new(a.store.clone(), a.hasher.clone(), a.tokens.clone());
        let attempt = |password: &str| LoginUserCommand {
            email: "sari@example.com".to_string(),
            password: password.to_string(),
        };
        assert_eq!(
            login.handle(attempt("hunter22!")).await.unwrap_err(),
            AccountError::WrongPassword
        );
        assert!(login.handle(attempt("correct-horse")).await.is_ok());
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let a = accounts();
        let handler = ResetPasswordHandler::new(a.store.clone(), a.hasher.clone());

        let err = handler
            .handle(ResetPasswordCommand {
                user_id: UserId::new(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let a = accounts();
        let handler = ResetPasswordHandler::new(a.store.clone(), a.hasher.clone());

        let err = handler
            .handle(ResetPasswordCommand {
                user_id: UserId::new(),
                password: "long-enough".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::NotFound(_)));
    }
}
