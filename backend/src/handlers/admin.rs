//! Administrator HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use crate::error::AppError;
use crate::middleware::CurrentAdmin;
use crate::services::business::parse_update;
use crate::AppState;

/// Every listing, approved or not
pub async fn list_all_businesses(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> impl IntoResponse {
    tracing::debug!(uid = %admin.uid, "Listing all businesses");

    match state.businesses.list_all().await {
        Ok(businesses) => {
            (StatusCode::OK, Json(serde_json::json!({ "businesses": businesses }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Edit a listing
pub async fn update_business(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let update = match parse_update(payload) {
        Ok(update) => update,
        Err(e) => return e.into_response(),
    };
    let business_id = update.id;

    match state.businesses.update(update).await {
        Ok(Some(business)) => {
            tracing::info!(uid = %admin.uid, email = %admin.email, business_id, "Admin updated business");
            (StatusCode::OK, Json(business)).into_response()
        }
        Ok(None) => AppError::NotFound(format!("Business {}", business_id)).into_response(),
        Err(e) => e.into_response(),
    }
}
