//! Public business directory HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use shared::{collect_tags, Business};

use crate::error::AppError;
use crate::services::business::{parse_submission, SearchQuery};
use crate::services::correction::parse_correction;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BusinessListResponse {
    pub businesses: Vec<Business>,
    /// Lowercased union of the listed businesses' tags
    pub tags: Vec<String>,
}

/// Search active businesses near a point or zipcode
pub async fn list_businesses(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    match state.businesses.search(&query).await {
        Ok(businesses) => {
            let tags = collect_tags(&businesses);
            (StatusCode::OK, Json(BusinessListResponse { businesses, tags })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get one publicly listed business
pub async fn get_business(
    State(state): State<AppState>,
    Path(business_id): Path<i32>,
) -> impl IntoResponse {
    match state.businesses.get_public(business_id).await {
        Ok(Some(business)) => (StatusCode::OK, Json(business)).into_response(),
        Ok(None) => AppError::NotFound(format!("Business {}", business_id)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Submit a new business for review
pub async fn create_business(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let input = match parse_submission(payload) {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    match state.businesses.submit(input).await {
        Ok(_) => StatusCode::CREATED.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Propose a correction to a listed business
pub async fn create_correction(
    State(state): State<AppState>,
    Path(business_id): Path<i32>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let input = match parse_correction(payload) {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    match state.corrections.submit(business_id, input).await {
        Ok(_) => StatusCode::CREATED.into_response(),
        Err(e) => e.into_response(),
    }
}
