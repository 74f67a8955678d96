//! Error handling for the takeout directory API
//!
//! Client errors are answered with enough detail to fix the request. Server
//! errors are logged under a fresh incident id and only that id is returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::services::geocoder::GeocodeError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    Forbidden,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Stored location is malformed: {0}")]
    StoredLocation(#[from] shared::WktError),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<Uuid>,
}

/// One failing field of a rejected payload
#[derive(Serialize, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail::new(code, message),
        }
    }
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            fields: None,
            incident_id: None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Geocode(_) | AppError::DatabaseError(_) | AppError::StoredLocation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Flatten validator's per-field errors into a stable, sorted list
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldError {
                field: field.to_string(),
                code: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match &self {
            AppError::Unauthorized(msg) => ErrorDetail::new("UNAUTHORIZED", msg.clone()),
            AppError::Forbidden => ErrorDetail::new(
                "FORBIDDEN",
                "You do not have permission to perform this action",
            ),
            AppError::Validation(errors) => ErrorDetail {
                fields: Some(field_errors(errors)),
                ..ErrorDetail::new(
                    "VALIDATION_ERROR",
                    "Submission is missing or has invalid fields",
                )
            },
            AppError::BadRequest(msg) => ErrorDetail::new("BAD_REQUEST", msg.clone()),
            AppError::NotFound(resource) => {
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource))
            }
            AppError::Geocode(_) => {
                ErrorDetail::new("GEOCODE_ERROR", "The address could not be located")
            }
            _ => ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
        };

        let detail = if status.is_server_error() {
            let incident_id = Uuid::new_v4();
            tracing::error!(%incident_id, "Error: {:?}", self);
            ErrorDetail {
                incident_id: Some(incident_id),
                ..detail
            }
        } else {
            // Absence and bad input are normal outcomes
            tracing::debug!("Request rejected: {}", self);
            detail
        };

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
