//! Credit store API server.

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use credit_store::adapters::auth::{Argon2PasswordHasher, JwtSessionValidator};
use credit_store::adapters::http::{app_router, AccountAppState, AuthState, CreditStoreAppState};
use credit_store::adapters::payment::MidtransGateway;
use credit_store::adapters::postgres::{
    PostgresCartRepository, PostgresCreditCatalog, PostgresSettlementStore,
    PostgresTransactionHistoryReader, PostgresUserAccounts,
};
use credit_store::application::{
    CartLedger, CheckoutCoordinator, ListCreditItemsHandler, ListTransactionHistoryHandler,
    LoginUserHandler, RegisterUserHandler, ResetPasswordHandler,
};
use credit_store::config::{AppConfig, ServerConfig};
use credit_store::domain::checkout::RandomOrderIdGenerator;
use credit_store::telemetry;

const REQUEST_ID_HEADER: &str = "x-request-id";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.server)?;
    config.validate()?;

    let addr = config.server.socket_addr()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let carts = Arc::new(PostgresCartRepository::new(pool.clone()));
    let catalog = Arc::new(PostgresCreditCatalog::new(pool.clone()));
    let users = Arc::new(PostgresUserAccounts::new(pool.clone()));
    let sessions = Arc::new(JwtSessionValidator::new(config.auth.jwt_config()));
    let hasher = Arc::new(Argon2PasswordHasher::new());

    let state = CreditStoreAppState {
        ledger: Arc::new(CartLedger::new(catalog.clone(), carts.clone())),
        checkout: Arc::new(
            CheckoutCoordinator::new(
                carts,
                users.clone(),
                Arc::new(MidtransGateway::new(config.payment.midtrans_config())),
                Arc::new(PostgresSettlementStore::new(pool.clone())),
                Arc::new(RandomOrderIdGenerator),
            )
            .with_charge_timeout(config.payment.charge_timeout()),
        ),
        catalog: Arc::new(ListCreditItemsHandler::new(catalog)),
        history: Arc::new(ListTransactionHistoryHandler::new(Arc::new(
            PostgresTransactionHistoryReader::new(pool.clone()),
        ))),
    };
    let accounts = AccountAppState {
        register: Arc::new(RegisterUserHandler::new(users.clone(), hasher.clone())),
        login: Arc::new(LoginUserHandler::new(
            users.clone(),
            hasher.clone(),
            sessions.clone(),
        )),
        reset_password: Arc::new(ResetPasswordHandler::new(users, hasher)),
    };
    let auth: AuthState = sessions;

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let app = app_router(state, accounts, auth)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        sandbox = config.payment.is_sandbox(),
        "Credit store listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
