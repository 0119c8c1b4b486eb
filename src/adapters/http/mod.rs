//! HTTP adapters - REST API implementations.

pub mod account;
pub mod credit_store;
pub mod middleware;
pub mod response;

use axum::{middleware::from_fn_with_state, routing::get, Router};

pub use account::{account_routes, AccountAppState};
pub use credit_store::{credit_store_routes, CreditStoreAppState};
pub use middleware::{auth_middleware, AuthState, RequireAuth};
pub use response::{ApiError, ApiResponse, ErrorResponse};

/// Path the credit store routes are nested under.
pub const CREDIT_STORE_PATH: &str = "/api/user/credit-store";

/// Assemble the API router: account routes, authenticated credit store
/// routes and an unauthenticated `/health` check.
///
/// Cross-cutting layers (tracing, timeouts, CORS) are added by the binary.
pub fn app_router(
    state: CreditStoreAppState,
    accounts: AccountAppState,
    auth: AuthState,
) -> Router {
    let credit_store = credit_store_routes()
        .with_state(state)
        .layer(from_fn_with_state(auth.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(account_routes(auth).with_state(accounts))
        .nest(CREDIT_STORE_PATH, credit_store)
}

async fn health() -> &'static str {
    "ok"
}
