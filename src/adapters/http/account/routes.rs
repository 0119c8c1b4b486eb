//! Axum router configuration for the account endpoints.

use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{login, register, reset_password, AccountAppState};

/// Create the account router, merged at the root.
///
/// # Routes
///
/// - `POST /api/register` - Sign up
/// - `POST /api/login` - Get a session token
/// - `POST /api/user/reset-password` - Change password (authenticated)
pub fn account_routes(auth: AuthState) -> Router<AccountAppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route(
            "/api/user/reset-password",
            post(reset_password).layer(from_fn_with_state(auth, auth_middleware)),
        )
}
