//! HTTP handlers for the credit store endpoints.
//!
//! These handlers connect Axum routes to the cart ledger, the checkout
//! coordinator and the catalog/history queries.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::response::{ApiError, ApiResponse, ErrorResponse};
use crate::application::{
    CartLedger, CheckoutCoordinator, ListCreditItemsHandler, ListTransactionHistoryHandler,
};
use crate::domain::cart::CartError;
use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::{CreditItemId, DomainError, ErrorCode};

use super::dto::{
    AddToCartRequest, CartEntryResponse, CartViewResponse, CheckoutResponse, CreditItemResponse,
    DecrementResponse, RemoveFromCartRequest, TransactionHistoryResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the credit store routes.
///
/// The coordinator must be a single shared instance: it owns the per-user
/// checkout slots.
#[derive(Clone)]
pub struct CreditStoreAppState {
    pub ledger: Arc<CartLedger>,
    pub checkout: Arc<CheckoutCoordinator>,
    pub catalog: Arc<ListCreditItemsHandler>,
    pub history: Arc<ListTransactionHistoryHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /all - Every credit item on sale
pub async fn list_credit_items(
    State(state): State<CreditStoreAppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.catalog.handle().await.map_err(handle_domain_error)?;
    let items: Vec<CreditItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok("All credit store", items).into_ok())
}

/// GET /view-cart - The caller's cart with totals
pub async fn view_cart(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .ledger
        .view_cart(user.id)
        .await
        .map_err(handle_cart_error)?;
    Ok(ApiResponse::ok("View cart", CartViewResponse::from(view)).into_ok())
}

/// GET /history - The caller's completed checkouts, newest first
pub async fn list_history(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .history
        .handle(user.id)
        .await
        .map_err(handle_domain_error)?;
    let rows: Vec<TransactionHistoryResponse> = rows.into_iter().map(Into::into).collect();
    Ok(ApiResponse::ok("Transaction history", rows).into_ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /add-to-cart - Add one unit of `{id}`
pub async fn add_to_cart(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(handle_json_rejection)?;
    let entry = state
        .ledger
        .add_item(user.id, request.id)
        .await
        .map_err(handle_cart_error)?;
    Ok(ApiResponse::ok("Added to cart", CartEntryResponse::from(entry)).into_ok())
}

/// POST /add-amount/:itemID - Increment an item, creating the entry if needed
pub async fn add_amount(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
    item_id: Result<Path<CreditItemId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(item_id) = item_id.map_err(handle_path_rejection)?;
    let entry = state
        .ledger
        .increment_item(user.id, item_id)
        .await
        .map_err(handle_cart_error)?;
    Ok(ApiResponse::ok("Added 1 amount", CartEntryResponse::from(entry)).into_ok())
}

/// POST /remove-amount/:itemID - Decrement an item, pruning it at zero
pub async fn remove_amount(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
    item_id: Result<Path<CreditItemId>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(item_id) = item_id.map_err(handle_path_rejection)?;
    let entry = state
        .ledger
        .decrement_item(user.id, item_id)
        .await
        .map_err(handle_cart_error)?;
    let message = if entry.is_some() {
        "Removed 1 amount"
    } else {
        "Removed"
    };
    Ok(ApiResponse::ok(message, DecrementResponse::from(entry)).into_ok())
}

/// DELETE /remove-from-cart - Drop an entry `{id}` regardless of quantity
pub async fn remove_from_cart(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<RemoveFromCartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(handle_json_rejection)?;
    state
        .ledger
        .remove_item(user.id, request.id)
        .await
        .map_err(handle_cart_error)?;
    Ok(ApiResponse::ok("Remove from cart", serde_json::json!({ "id": request.id })).into_ok())
}

/// POST /payment - Charge the cart and settle it
pub async fn checkout(
    State(state): State<CreditStoreAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state
        .checkout
        .checkout(user.id)
        .await
        .map_err(handle_checkout_error)?;
    Ok(ApiResponse::ok("Payment success", CheckoutResponse::from(receipt)).into_ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Maps cart failures onto HTTP statuses.
pub fn handle_cart_error(err: CartError) -> ApiError {
    let status = match &err {
        CartError::ItemNotFound(_) | CartError::NotInCart(_) | CartError::EntryNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        CartError::Forbidden(_) => StatusCode::FORBIDDEN,
        CartError::InvalidState(_) | CartError::Conflict(_) => StatusCode::CONFLICT,
        CartError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        CartError::Storage(msg) => {
            tracing::error!(error = %msg, "Cart storage failure");
            return internal_error();
        }
    };

    ApiError::new(status, ErrorResponse::new(err.code().to_string(), err.message()))
}

/// Maps checkout failures onto HTTP statuses; gateway failures carry the order id.
pub fn handle_checkout_error(err: CheckoutError) -> ApiError {
    let status = match &err {
        CheckoutError::UserNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::EmptyCart | CheckoutError::InProgress(_) | CheckoutError::InvalidState(_) => {
            StatusCode::CONFLICT
        }
        CheckoutError::GatewayRejected { .. } => StatusCode::BAD_GATEWAY,
        CheckoutError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        CheckoutError::SettlementFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        CheckoutError::Storage(msg) => {
            tracing::error!(error = %msg, "Checkout storage failure");
            return internal_error();
        }
    };

    let mut body = ErrorResponse::new(err.code().to_string(), err.message());
    if let Some(order_id) = err.order_id() {
        body = body.with_details(serde_json::json!({ "order_id": order_id }));
    }
    ApiError::new(status, body)
}

fn handle_domain_error(err: DomainError) -> ApiError {
    let status = match err.code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        code if code.is_not_found() => StatusCode::NOT_FOUND,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        _ => {
            tracing::error!(error = %err, "Query failed");
            return internal_error();
        }
    };
    ApiError::new(status, ErrorResponse::new(err.code.to_string(), err.message))
}

fn handle_json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), rejection.body_text()),
    )
}

fn handle_path_rejection(rejection: PathRejection) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), rejection.body_text()),
    )
}

fn internal_error() -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new(ErrorCode::InternalError.to_string(), "Internal server error"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::OrderId;
    use crate::domain::foundation::{CartEntryId, UserId};

    #[test]
    fn cart_errors_map_to_statuses() {
        let cases = [
            (CartError::item_not_found(CreditItemId::new(1)), StatusCode::NOT_FOUND),
            (CartError::not_in_cart(CreditItemId::new(1)), StatusCode::NOT_FOUND),
            (CartError::entry_not_found(CartEntryId::new()), StatusCode::NOT_FOUND),
            (CartError::forbidden(CartEntryId::new()), StatusCode::FORBIDDEN),
            (CartError::invalid_state("below zero"), StatusCode::CONFLICT),
            (CartError::conflict("retries exhausted"), StatusCode::CONFLICT),
            (CartError::validation("quantity", "overflow"), StatusCode::BAD_REQUEST),
            (CartError::storage("db down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(handle_cart_error(err).status, expected);
        }
    }

    #[test]
    fn storage_errors_hide_internals() {
        let api = handle_cart_error(CartError::storage("password=hunter2"));
        assert!(!api.body.message.contains("hunter2"));
        assert_eq!(api.body.error_code, "INTERNAL_ERROR");
    }

    #[test]
    fn checkout_errors_map_to_statuses() {
        let order = OrderId::new("CS-1");
        let cases = [
            (CheckoutError::EmptyCart, StatusCode::CONFLICT),
            (CheckoutError::in_progress(UserId::new()), StatusCode::CONFLICT),
            (CheckoutError::user_not_found(UserId::new()), StatusCode::NOT_FOUND),
            (
                CheckoutError::gateway_rejected(order.clone(), "deny"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CheckoutError::gateway_timeout(order.clone(), 30),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                CheckoutError::settlement_failed(order, "db down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(handle_checkout_error(err).status, expected);
        }
    }

    #[test]
    fn gateway_errors_carry_order_id() {
        let api = handle_checkout_error(CheckoutError::gateway_rejected(
            OrderId::new("CS-42"),
            "deny",
        ));
        assert_eq!(api.body.details.unwrap()["order_id"], "CS-42");
    }

    #[test]
    fn empty_cart_uses_its_own_code() {
        let api = handle_checkout_error(CheckoutError::EmptyCart);
        assert_eq!(api.body.error_code, "EMPTY_CART");
    }
}
