//! Integration tests for the credit store and account HTTP endpoints.
//!
//! Requests go through the full router (auth middleware included) backed by
//! the in-memory store, the mock gateway and the plain-text hasher.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use credit_store::adapters::auth::{
    JwtConfig, JwtSessionValidator, MockPasswordHasher, MockSessionValidator,
};
use credit_store::adapters::http::{app_router, AccountAppState, AuthState, CreditStoreAppState};
use credit_store::adapters::memory::InMemoryCreditStore;
use credit_store::adapters::payment::MockPaymentGateway;
use credit_store::application::{
    CartLedger, CheckoutCoordinator, ListCreditItemsHandler, ListTransactionHistoryHandler,
    LoginUserHandler, RegisterUserHandler, ResetPasswordHandler,
};
use credit_store::domain::catalog::CreditItem;
use credit_store::domain::checkout::{Customer, SequentialOrderIdGenerator};
use credit_store::domain::foundation::{CreditItemId, UserId};
use credit_store::ports::{ChargeStatus, TokenIssuer};
use secrecy::SecretString;

// =============================================================================
// Test Infrastructure
// =============================================================================

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";
const SETTLE_ATTEMPTS: u32 = 2;

struct TestApp {
    router: Router,
    store: InMemoryCreditStore,
    gateway: MockPaymentGateway,
    alice: UserId,
}

fn state(store: &InMemoryCreditStore, gateway: &MockPaymentGateway) -> CreditStoreAppState {
    let ports = Arc::new(store.clone());
    CreditStoreAppState {
        ledger: Arc::new(CartLedger::new(ports.clone(), ports.clone())),
        checkout: Arc::new(
            CheckoutCoordinator::new(
                ports.clone(),
                ports.clone(),
                Arc::new(gateway.clone()),
                ports.clone(),
                Arc::new(SequentialOrderIdGenerator::new("TEST")),
            )
            .with_settlement_retries(SETTLE_ATTEMPTS, Duration::from_millis(1)),
        ),
        catalog: Arc::new(ListCreditItemsHandler::new(ports.clone())),
        history: Arc::new(ListTransactionHistoryHandler::new(ports)),
    }
}

fn accounts(store: &InMemoryCreditStore, tokens: Arc<dyn TokenIssuer>) -> AccountAppState {
    let ports = Arc::new(store.clone());
    let hasher = Arc::new(MockPasswordHasher::new());
    AccountAppState {
        register: Arc::new(RegisterUserHandler::new(ports.clone(), hasher.clone())),
        login: Arc::new(LoginUserHandler::new(ports.clone(), hasher.clone(), tokens)),
        reset_password: Arc::new(ResetPasswordHandler::new(ports, hasher)),
    }
}

async fn seeded_store() -> (InMemoryCreditStore, UserId, UserId) {
    let store = InMemoryCreditStore::new();
    store
        .add_credit_item(CreditItem::new(CreditItemId::new(1), 100, 10))
        .await;
    store
        .add_credit_item(CreditItem::new(CreditItemId::new(2), 250, 30))
        .await;

    let alice = UserId::new();
    let bob = UserId::new();
    store
        .add_user(alice, Customer::new("Alice", "alice@example.com", "0811"), 0)
        .await;
    store
        .add_user(bob, Customer::new("Bob", "bob@example.com", "0822"), 0)
        .await;
    (store, alice, bob)
}

async fn test_app() -> TestApp {
    let (store, alice, bob) = seeded_store().await;
    let gateway = MockPaymentGateway::new();
    let validator = Arc::new(
        MockSessionValidator::new()
            .with_user(ALICE, alice)
            .with_user(BOB, bob),
    );
    let auth: AuthState = validator.clone();

    TestApp {
        router: app_router(state(&store, &gateway), accounts(&store, validator), auth),
        store,
        gateway,
        alice,
    }
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_to(app, method, &format!("/api/user/credit-store{}", uri), token, body).await
}

async fn send_to(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn add_to_cart(app: &TestApp, token: &str, item: i64) -> (StatusCode, Value) {
    send(app, Method::POST, "/add-to-cart", Some(token), Some(json!({ "id": item }))).await
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/view-cart", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/view-cart", Some("stolen"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn signed_jwt_authenticates_through_the_router() {
    let (store, alice, _) = seeded_store().await;
    let gateway = MockPaymentGateway::new();
    let validator = JwtSessionValidator::new(JwtConfig::new(SecretString::new(
        "integration-secret".to_string(),
    )));
    let token = validator.sign(alice).unwrap();
    let validator = Arc::new(validator);
    let app = TestApp {
        router: app_router(
            state(&store, &gateway),
            accounts(&store, validator.clone()),
            validator,
        ),
        store,
        gateway,
        alice,
    };

    let (status, _) = add_to_cart(&app, &token, 1).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = test_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Catalog and cart
// =============================================================================

#[tokio::test]
async fn lists_catalog() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/all", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All credit store");
    assert_eq!(
        body["data"],
        json!([
            {"id": 1, "price": 100, "points": 10},
            {"id": 2, "price": 250, "points": 30}
        ])
    );
}

#[tokio::test]
async fn empty_cart_views_as_zero_totals() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/view-cart", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"total": 0, "totalPoints": 0, "cart": []}));
}

#[tokio::test]
async fn adding_twice_accumulates_one_entry() {
    let app = test_app().await;

    add_to_cart(&app, ALICE, 1).await;
    let (status, body) = add_to_cart(&app, ALICE, 1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 2);

    let (_, view) = send(&app, Method::GET, "/view-cart", Some(ALICE), None).await;
    assert_eq!(view["data"]["total"], 200);
    assert_eq!(view["data"]["totalPoints"], 20);
    assert_eq!(view["data"]["cart"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn carts_are_per_user() {
    let app = test_app().await;

    add_to_cart(&app, ALICE, 1).await;

    let (_, view) = send(&app, Method::GET, "/view-cart", Some(BOB), None).await;
    assert_eq!(view["data"]["cart"], json!([]));
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let app = test_app().await;

    let (status, body) = add_to_cart(&app, ALICE, 99).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "CREDIT_ITEM_NOT_FOUND");
}

#[tokio::test]
async fn malformed_body_is_unprocessable() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-to-cart",
        Some(ALICE),
        Some(json!({ "id": "one" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn non_numeric_item_path_is_bad_request() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::POST, "/add-amount/abc", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_amount_creates_missing_entry() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/add-amount/2", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 1);
    assert_eq!(body["data"]["price"], 250);
}

#[tokio::test]
async fn remove_amount_prunes_at_zero() {
    let app = test_app().await;
    add_to_cart(&app, ALICE, 1).await;
    add_to_cart(&app, ALICE, 1).await;

    let (status, body) = send(&app, Method::POST, "/remove-amount/1", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Removed 1 amount");
    assert_eq!(body["data"]["entry"]["quantity"], 1);
    assert_eq!(body["data"]["entry"]["price"], 100);

    let (status, body) = send(&app, Method::POST, "/remove-amount/1", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Removed");
    assert_eq!(body["data"]["removed"], true);

    let (status, body) = send(&app, Method::POST, "/remove-amount/1", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "CART_ENTRY_NOT_FOUND");
}

#[tokio::test]
async fn remove_from_cart_checks_ownership() {
    let app = test_app().await;
    let (_, added) = add_to_cart(&app, ALICE, 2).await;
    let entry_id = added["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/remove-from-cart",
        Some(BOB),
        Some(json!({ "id": entry_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/remove-from-cart",
        Some(ALICE),
        Some(json!({ "id": entry_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/remove-from-cart",
        Some(ALICE),
        Some(json!({ "id": entry_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn payment_settles_cart_and_records_history() {
    let app = test_app().await;
    add_to_cart(&app, ALICE, 1).await;
    add_to_cart(&app, ALICE, 2).await;

    let (status, body) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_id"], "TEST-1");
    assert_eq!(body["data"]["transaction_status"], "settlement");
    assert_eq!(body["data"]["point_balance"], 40);
    assert_eq!(body["data"]["history"]["price"], 350);
    assert_eq!(body["data"]["cart"]["cart"], json!([]));

    let charges = app.gateway.charges();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].gross_amount, 350);
    assert_eq!(charges[0].customer.email, "alice@example.com");

    let (_, history) = send(&app, Method::GET, "/history", Some(ALICE), None).await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
    assert_eq!(history["data"][0]["order_id"], "TEST-1");
    assert_eq!(history["data"][0]["points"], 40);

    assert_eq!(app.store.point_balance(&app.alice).await, Some(40));
}

#[tokio::test]
async fn payment_on_empty_cart_conflicts() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "EMPTY_CART");
    assert_eq!(app.gateway.charge_count(), 0);
}

#[tokio::test]
async fn declined_payment_leaves_cart_untouched() {
    let app = test_app().await;
    add_to_cart(&app, ALICE, 1).await;
    app.gateway.set_status(ChargeStatus::Deny);

    let (status, body) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_code"], "PAYMENT_FAILED");
    assert_eq!(body["details"]["order_id"], "TEST-1");

    let (_, view) = send(&app, Method::GET, "/view-cart", Some(ALICE), None).await;
    assert_eq!(view["data"]["total"], 100);
    assert_eq!(app.store.history_count().await, 0);
}

#[tokio::test]
async fn second_payment_hits_empty_cart() {
    let app = test_app().await;
    add_to_cart(&app, ALICE, 1).await;

    let (first, _) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;
    let (second, body) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "EMPTY_CART");
    assert_eq!(app.gateway.charge_count(), 1);
}

#[tokio::test]
async fn failed_settlement_is_a_server_error_with_order_id() {
    let app = test_app().await;
    add_to_cart(&app, ALICE, 1).await;
    app.store.fail_settlements(SETTLE_ATTEMPTS);

    let (status, body) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"]["order_id"], "TEST-1");
    assert_eq!(app.store.point_balance(&app.alice).await, Some(0));
    assert_eq!(app.store.history_count().await, 0);
}

#[tokio::test]
async fn payment_after_failed_settlement_settles_without_charging_again() {
    let app = test_app().await;
    add_to_cart(&app, ALICE, 1).await;
    app.store.fail_settlements(SETTLE_ATTEMPTS);
    let (status, _) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(&app, Method::POST, "/payment", Some(ALICE), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_id"], "TEST-1");
    assert_eq!(app.gateway.charge_count(), 1);
    assert_eq!(app.store.point_balance(&app.alice).await, Some(10));
    assert_eq!(app.store.history_count().await, 1);
}

// =============================================================================
// Accounts
// =============================================================================

fn registration(email: &str) -> Value {
    json!({
        "name": "Sari",
        "email": email,
        "phone": "0812",
        "password": "hunter22!",
        "confirm_password": "hunter22!"
    })
}

#[tokio::test]
async fn register_then_login_then_shop() {
    let app = test_app().await;

    let (status, body) =
        send_to(&app, Method::POST, "/api/register", None, Some(registration("sari@example.com")))
            .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Account created");
    assert_eq!(body["data"]["email"], "sari@example.com");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send_to(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "sari@example.com", "password": "hunter22!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Parsed token");
    assert_eq!(body["data"]["name"], "Sari");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = add_to_cart(&app, &token, 1).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, "/payment", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["point_balance"], 10);
}

#[tokio::test]
async fn register_rejects_bad_forms() {
    let app = test_app().await;
    let mut mismatched = registration("sari@example.com");
    mismatched["confirm_password"] = json!("something-else");

    let (status, body) = send_to(&app, Method::POST, "/api/register", None, Some(mismatched)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");

    let (status, _) =
        send_to(&app, Method::POST, "/api/register", None, Some(registration("not-an-email")))
            .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) =
        send_to(&app, Method::POST, "/api/register", None, Some(json!({"name": "Sari"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn register_with_taken_email_conflicts() {
    let app = test_app().await;

    let (status, body) =
        send_to(&app, Method::POST, "/api/register", None, Some(registration("alice@example.com")))
            .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn login_failures_are_distinguished() {
    let app = test_app().await;
    send_to(&app, Method::POST, "/api/register", None, Some(registration("sari@example.com"))).await;

    let (status, body) = send_to(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "sari@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Wrong password");

    let (status, _) = send_to(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": "hunter22!"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_password_needs_a_session_and_changes_login() {
    let app = test_app().await;
    send_to(&app, Method::POST, "/api/register", None, Some(registration("sari@example.com"))).await;
    let login = |password: &str| json!({"email": "sari@example.com", "password": password});
    let (_, body) =
        send_to(&app, Method::POST, "/api/login", None, Some(login("hunter22!"))).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let new_password = json!({"password": "correct-horse"});

    let (status, _) = send_to(
        &app,
        Method::POST,
        "/api/user/reset-password",
        None,
        Some(new_password.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_to(
        &app,
        Method::POST,
        "/api/user/reset-password",
        Some(&token),
        Some(new_password),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset");

    let (status, _) =
        send_to(&app, Method::POST, "/api/login", None, Some(login("hunter22!"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) =
        send_to(&app, Method::POST, "/api/login", None, Some(login("correct-horse"))).await;
    assert_eq!(status, StatusCode::OK);
}
