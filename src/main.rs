use anyhow::Result;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use limitter::{
    config::Config,
    handlers::*,
    middleware::require_admin,
    services::{RedisTransactionStore, StripeGateway, TransactionStore},
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting Limitter API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Initialize services
    let store = Arc::new(RedisTransactionStore::new(&config.redis_url).await?);
    let gateway = Arc::new(StripeGateway::new(
        config.stripe_api_url.clone(),
        config.stripe_secret_key.clone(),
    ));

    // Build application state
    let dyn_store: Arc<dyn TransactionStore> = store.clone();
    let app_state = AppState {
        store: dyn_store.clone(),
        gateway: gateway.clone(),
    };

    let health_state = HealthState {
        store: store.clone(),
        gateway_configured: config.gateway_key_plausible(),
    };

    // Admin surface: identity resolved per request, is_admin required.
    let admin_routes = Router::new()
        .route("/api/admin/transactions", get(list_transactions))
        .route("/api/admin/transactions/search", get(search_transactions))
        .route("/api/admin/transactions/:id", get(transaction_details))
        .layer(axum_middleware::from_fn({
            let store = dyn_store.clone();
            move |req, next| {
                let store = store.clone();
                async move { require_admin(store, req, next).await }
            }
        }));

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(health_state)
        .route("/api/create-payment-intent", post(create_payment_intent))
        .route("/api/get-session", post(get_session))
        .route("/api/users/:id/transactions", get(user_transactions))
        .merge(admin_routes)
        .with_state(app_state)
        // Global middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
