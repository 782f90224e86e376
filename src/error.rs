//! Error types for the object cache
//!
//! Provides unified error handling using thiserror. A cache miss is never an
//! error: backends report absence through `None` slots in `get` results.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for storage backends and the object service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The caller's context was cancelled before the backend finished
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's context deadline elapsed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A backend could not be constructed (missing endpoint, bad credentials, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A constructed backend failed while serving a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// Parallel key and value sequences differ in length
    #[error("Got {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },

    /// A stored value could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found (HTTP single-key lookups only)
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::LengthMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Cancelled | CacheError::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Backend(_) | CacheError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the object cache.
pub type Result<T> = std::result::Result<T, CacheError>;
