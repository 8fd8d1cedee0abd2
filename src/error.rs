//! Error types for the market data cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures raised at the store boundary.
///
/// None of these ever reach an end user: the tiered cache logs them and
/// degrades to a miss (reads) or a secondary-only write.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Primary store is down, unreachable or timed out
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Secondary store cannot accept the entry
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

// == Origin Error Enum ==
/// Failures talking to the upstream analytics API.
#[derive(Error, Debug)]
pub enum OriginError {
    /// Upstream answered with a non-2xx status
    #[error("Origin returned status {0}")]
    Status(u16),

    /// Transport failure (connect, timeout, body read)
    #[error("Origin request failed: {0}")]
    Network(String),

    /// Upstream body was not the expected JSON shape
    #[error("Origin payload invalid: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for OriginError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            OriginError::Status(status.as_u16())
        } else if err.is_decode() {
            OriginError::InvalidPayload(err.to_string())
        } else {
            OriginError::Network(err.to_string())
        }
    }
}

// == API Error Enum ==
/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed query parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
