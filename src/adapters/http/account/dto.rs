//! Request and response bodies for the account endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{
    LoginUserCommand, LoginUserResult, RegisterUserCommand, ResetPasswordCommand,
};
use crate::domain::account::UserAccount;
use crate::domain::foundation::UserId;

/// Body of `POST /api/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

impl From<RegisterRequest> for RegisterUserCommand {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
            confirm_password: req.confirm_password,
        }
    }
}

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<LoginRequest> for LoginUserCommand {
    fn from(req: LoginRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

/// Body of `POST /api/user/reset-password`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

impl ResetPasswordRequest {
    pub fn into_command(self, user_id: UserId) -> ResetPasswordCommand {
        ResetPasswordCommand {
            user_id,
            password: self.password,
        }
    }
}

/// The created account; never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<UserAccount> for AccountResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name,
            email: account.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub name: String,
    pub token: String,
}

impl From<LoginUserResult> for LoginResponse {
    fn from(result: LoginUserResult) -> Self {
        Self {
            name: result.name,
            token: result.token,
        }
    }
}
