//! HTTP handlers for the account endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::response::{ApiError, ApiResponse, ErrorResponse};
use crate::application::{LoginUserHandler, RegisterUserHandler, ResetPasswordHandler};
use crate::domain::account::AccountError;
use crate::domain::foundation::ErrorCode;

use super::dto::{AccountResponse, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest};

/// Shared state for the account routes.
#[derive(Clone)]
pub struct AccountAppState {
    pub register: Arc<RegisterUserHandler>,
    pub login: Arc<LoginUserHandler>,
    pub reset_password: Arc<ResetPasswordHandler>,
}

/// POST /api/register - Create an account
pub async fn register(
    State(state): State<AccountAppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(handle_json_rejection)?;
    let account = state
        .register
        .handle(request.into())
        .await
        .map_err(handle_account_error)?;
    Ok(ApiResponse::ok("Account created", AccountResponse::from(account)).into_created())
}

/// POST /api/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<AccountAppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(handle_json_rejection)?;
    let result = state
        .login
        .handle(request.into())
        .await
        .map_err(handle_account_error)?;
    Ok(ApiResponse::ok("Parsed token", LoginResponse::from(result)).into_ok())
}

/// POST /api/user/reset-password - Replace the caller's password
pub async fn reset_password(
    State(state): State<AccountAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(handle_json_rejection)?;
    state
        .reset_password
        .handle(request.into_command(user.id))
        .await
        .map_err(handle_account_error)?;
    Ok(ApiResponse::ok("Password reset", ()).into_ok())
}

/// Maps account failures onto HTTP statuses.
pub fn handle_account_error(err: AccountError) -> ApiError {
    let status = match &err {
        AccountError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AccountError::EmailTaken(_) => StatusCode::CONFLICT,
        AccountError::NotFound(_) => StatusCode::NOT_FOUND,
        AccountError::WrongPassword => StatusCode::FORBIDDEN,
        AccountError::Storage(msg) => {
            tracing::error!(error = %msg, "Account storage failure");
            return ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ErrorCode::InternalError.to_string(), "Internal server error"),
            );
        }
    };

    ApiError::new(status, ErrorResponse::new(err.code().to_string(), err.message()))
}

fn handle_json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), rejection.body_text()),
    )
}
