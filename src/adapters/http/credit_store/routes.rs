//! Axum router configuration for the credit store endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    add_amount, add_to_cart, checkout, list_credit_items, list_history, remove_amount,
    remove_from_cart, view_cart, CreditStoreAppState,
};

/// Create the credit store router, mounted at `/api/user/credit-store`.
///
/// # Routes
///
/// - `GET /all` - List the catalog
/// - `GET /view-cart` - Cart entries and totals
/// - `POST /add-to-cart` - Add one unit of `{id}`
/// - `POST /add-amount/:itemID` - Increment an item
/// - `POST /remove-amount/:itemID` - Decrement an item
/// - `DELETE /remove-from-cart` - Remove entry `{id}`
/// - `POST /payment` - Checkout
/// - `GET /history` - Completed checkouts
///
/// Every route requires `RequireAuth`, so the auth middleware must be layered
/// on top.
pub fn credit_store_routes() -> Router<CreditStoreAppState> {
    Router::new()
        .route("/all", get(list_credit_items))
        .route("/view-cart", get(view_cart))
        .route("/add-to-cart", post(add_to_cart))
        .route("/add-amount/:itemID", post(add_amount))
        .route("/remove-amount/:itemID", post(remove_amount))
        .route("/remove-from-cart", delete(remove_from_cart))
        .route("/payment", post(checkout))
        .route("/history", get(list_history))
}
