//! Error types for the verdict service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::AppEnv;

// == API Error Enum ==
/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing video locator
    #[error("{0}")]
    InvalidRequest(String),

    /// Daily quota for new analyses is used up
    #[error("Daily limit exceeded: {requests_today}/{limit}")]
    QuotaExceeded { limit: u64, requests_today: u64 },

    /// A collaborator rejected the input itself
    #[error("{0}")]
    UpstreamValidation(String),

    /// A collaborator failed while processing
    #[error("{0}")]
    UpstreamProcessing(String),

    /// Unhandled failure inside the service
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Hides internal details outside development deployments.
    pub fn for_env(self, env: AppEnv) -> Self {
        match self {
            ApiError::Internal(_) if !env.is_dev() => {
                ApiError::Internal("An error occurred".to_string())
            }
            other => other,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::UpstreamValidation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamProcessing(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::QuotaExceeded {
                limit,
                requests_today,
            } => json!({
                "error": "Daily limit exceeded",
                "message": "The daily limit for new video analysis has been reached. Please try again tomorrow!",
                "note": "Cached videos do not count toward the limit.",
                "limit": limit,
                "requests_today": requests_today,
            }),
            ApiError::Internal(detail) => json!({
                "error": "Internal server error",
                "detail": detail,
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// == Cache Error Enum ==
/// Failures inside a cache backend. Never surfaced to clients.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis command or connection failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend did not answer in time
    #[error("Cache operation timed out")]
    Timeout,

    /// Stored payload could not be (de)serialized
    #[error("Corrupt cache payload: {0}")]
    Payload(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, ApiError>;
