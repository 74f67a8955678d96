//! Route definitions for the takeout directory API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::admin_middleware, AppState};

/// Create API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Directory (public)
        .nest("/businesses", business_routes())
        // Slack interactive actions (signed by Slack)
        .route("/slack/actions", post(handlers::handle_slack_action))
        // Admin (identity token + admin registry)
        .nest("/admin", admin_routes(state))
}

/// Public directory routes
fn business_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_businesses).post(handlers::create_business),
        )
        .route("/:business_id", get(handlers::get_business))
        .route("/:business_id/correction", post(handlers::create_correction))
}

/// Admin routes (protected)
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_all_businesses).put(handlers::update_business),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
}
