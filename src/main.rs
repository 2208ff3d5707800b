//! Tollgate service entrypoint.
//!
//! Loads configuration, connects to PostgreSQL, wires the Stripe adapter
//! into the billing handlers, and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tollgate::adapters::events::LogNotificationPublisher;
use tollgate::adapters::host::PostgresUserDirectory;
use tollgate::adapters::http::billing::{billing_router, BillingAppState};
use tollgate::adapters::postgres::PostgresSubscriptionStore;
use tollgate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use tollgate::config::AppConfig;
use tollgate::domain::billing::{CatalogCache, EventValidator};
use tollgate::ports::PaymentProvider;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("tollgate exited with error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        live_mode = config.payment.is_live_mode(),
        "Starting tollgate"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let mut stripe_config = StripeConfig::new(
        config.payment.stripe_api_key.clone(),
        config.payment.stripe_webhook_secret.clone(),
    )
    .with_require_livemode(config.payment.require_livemode);
    if let Some(base_url) = &config.payment.api_base_url {
        stripe_config = stripe_config.with_base_url(base_url.clone());
    }

    let provider: Arc<dyn PaymentProvider> = Arc::new(StripePaymentAdapter::new(stripe_config));

    let state = BillingAppState {
        store: Arc::new(PostgresSubscriptionStore::new(pool.clone())),
        users: Arc::new(PostgresUserDirectory::new(pool)),
        provider: Arc::clone(&provider),
        publisher: Arc::new(LogNotificationPublisher::new()),
        catalog: Arc::new(CatalogCache::new(
            provider,
            config.payment.site_base_url.clone(),
        )),
        validator: EventValidator::new(config.payment.webhook_user_agent_prefix.clone()),
    };

    let app = Router::new()
        .route("/health", get(health))
        .nest("/v1", billing_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}
