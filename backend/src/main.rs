//! Open For Takeout - API server
//!
//! Serves the public business directory, accepts submissions and corrections,
//! and applies approvals coming back from Slack.

use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openfortakeout_api::{
    create_app,
    external::{GeocodioClient, SlackWebhookClient},
    middleware::JwtIdentityVerifier,
    services::{
        LogNotifier, Notifier, PgAdminRepository, PgBusinessRepository, PgCorrectionRepository,
        PgZipcodeCache,
    },
    AppState, Config, ServerDeps,
};

fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "takeout_server=debug,openfortakeout_api=debug,tower_http=debug,sqlx=warn".into()
    });

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(&config.log_format);

    tracing::info!("Starting Open For Takeout API");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations outside production
    if !config.is_production() {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let notifier: Arc<dyn Notifier> = if config.slack.webhook_url.is_empty() {
        tracing::warn!("No Slack webhook configured, notifications will only be logged");
        Arc::new(LogNotifier)
    } else {
        Arc::new(SlackWebhookClient::new(
            config.slack.webhook_url.clone(),
            !config.is_production(),
        ))
    };

    let deps = ServerDeps {
        businesses: Arc::new(PgBusinessRepository::new(db_pool.clone())),
        corrections: Arc::new(PgCorrectionRepository::new(db_pool.clone())),
        zipcodes: Arc::new(PgZipcodeCache::new(db_pool.clone())),
        geocoding: Arc::new(GeocodioClient::with_base_url(
            config.geocodio.api_key.clone(),
            config.geocodio.base_url.clone(),
        )),
        notifier,
        admins: Arc::new(PgAdminRepository::new(db_pool.clone())),
        identity: Arc::new(JwtIdentityVerifier::new(&config.auth)),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::new(db_pool, config, deps);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
