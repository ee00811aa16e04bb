//! Error types for topper-api
//!
//! Every failure reaches the client as `{ "error": <code>, "message": <text> }`.
//! Codes are stable; messages are for humans.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use topper_common::rating::RatingError;
use topper_common::validation::ValidationError;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation (400)
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    /// Body was not JSON at all (400)
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Resource not found (404)
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    /// Client exceeded its request quota (429)
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Rating computed but not durably written (500)
    #[error("Failed to persist rating: {0}")]
    PersistFailed(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(e) => e.code(),
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::NotFound { code, .. } => *code,
            ApiError::RateLimited { .. } => "rate_limit_exceeded",
            ApiError::PersistFailed(_) => "persist_failed",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PersistFailed(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        match self {
            ApiError::RateLimited { retry_after_secs } => {
                let body = Json(json!({
                    "error": code,
                    "message": self.to_string(),
                    "retryAfterSeconds": retry_after_secs,
                }));
                let mut response = (status, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            ApiError::PersistFailed(ref detail) | ApiError::Internal(ref detail) => {
                // Details stay in the log
                error!(code, detail = %detail, "Request failed");
                let message = match code {
                    "persist_failed" => "Vote not guaranteed recorded; retry later",
                    _ => "Internal server error",
                };
                (status, Json(json!({ "error": code, "message": message }))).into_response()
            }
            _ => {
                let body = Json(json!({ "error": code, "message": self.to_string() }));
                (status, body).into_response()
            }
        }
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::InvalidInput(e) => ApiError::InvalidInput(e),
            RatingError::ItemNotFound(id) => {
                ApiError::not_found("item_not_found", format!("Item not found: {}", id))
            }
            RatingError::StoreRead(e) => ApiError::Internal(e.to_string()),
            RatingError::PersistFailed(e) => ApiError::PersistFailed(e.to_string()),
        }
    }
}

impl From<topper_common::Error> for ApiError {
    fn from(err: topper_common::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
