//! Open For Takeout - directory API
//!
//! Crowd-sourced listings of local businesses offering takeout, delivery or
//! gift cards during closures. Submissions and corrections are reviewed in
//! Slack before they become public.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use middleware::IdentityVerifier;
use services::{
    AdminRepository, ApprovalService, BusinessRepository, BusinessService, CorrectionRepository,
    CorrectionService, Geocoder, GeocodingProvider, Notifier, ZipcodeCache,
};

/// Implementations behind every service seam
pub struct ServerDeps {
    pub businesses: Arc<dyn BusinessRepository>,
    pub corrections: Arc<dyn CorrectionRepository>,
    pub zipcodes: Arc<dyn ZipcodeCache>,
    pub geocoding: Arc<dyn GeocodingProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub admins: Arc<dyn AdminRepository>,
    pub identity: Arc<dyn IdentityVerifier>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub businesses: BusinessService,
    pub corrections: CorrectionService,
    pub approvals: ApprovalService,
    pub notifier: Arc<dyn Notifier>,
    pub admins: Arc<dyn AdminRepository>,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config, deps: ServerDeps) -> Self {
        let geocoder = Geocoder::new(deps.geocoding, deps.zipcodes);

        Self {
            db,
            config: Arc::new(config),
            businesses: BusinessService::new(
                deps.businesses.clone(),
                geocoder,
                deps.notifier.clone(),
            ),
            corrections: CorrectionService::new(
                deps.corrections.clone(),
                deps.businesses.clone(),
                deps.notifier.clone(),
            ),
            approvals: ApprovalService::new(deps.businesses, deps.corrections),
            notifier: deps.notifier,
            admins: deps.admins,
            identity: deps.identity,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Open For Takeout API"
}
