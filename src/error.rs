//! Error types for the stats/cursor cache
//!
//! Provides unified error handling using thiserror. None of these errors
//! escape a `StatsCursorCache` operation; they exist so backends and key
//! construction can report failures that the cache then logs and swallows.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Backend Error ==
/// Failure reported by a `CacheBackend` implementation.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Redis command or connection failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the key or value
    #[error("Rejected by backend: {0}")]
    Rejected(String),
}

// == Key Error ==
/// Invalid component passed to the key builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("{component} must not be empty")]
    Empty { component: &'static str },

    #[error("{component} must not contain the key separator '{separator}'")]
    ContainsSeparator {
        component: &'static str,
        separator: char,
    },

    /// One namespace prefix is a prefix of the other, so pattern
    /// invalidation of one namespace could reach into the other.
    #[error("Key prefixes overlap: '{0}' and '{1}'")]
    OverlappingPrefixes(String, String),
}

// == API Error ==
/// Error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Nothing cached under the requested key
    #[error("Not cached: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
