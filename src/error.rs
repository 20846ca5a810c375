//! Worker error types with HTTP status code mapping.
//!
//! [`WorkerError`] is the central error type for the worker. The consumer
//! loop handles every variant locally; the results endpoint maps them to a
//! structured JSON error response. [`ParseError`] is the normalizer's
//! rejection reason for a malformed queue payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "store error: connection reset"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Reason a raw queue payload could not be turned into a vote.
///
/// A payload that fails to parse will never become well-formed, so these
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The payload is not a JSON object, or a field has the wrong type.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A required field is present but empty or whitespace-only.
    #[error("empty field `{0}`")]
    EmptyField(&'static str),
}

/// Worker-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request           |
/// | 3000–3999 | Dependency | 500 / 503                 |
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Queue payload rejected by the normalizer.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Durable store read or write failed after connecting.
    #[error("store error: {0}")]
    Store(String),

    /// Queue read or write failed after connecting.
    #[error("queue error: {0}")]
    Queue(String),

    /// A dependency could not be reached within the retry policy.
    #[error("could not connect to {dependency} after {attempts} attempts")]
    Connect {
        /// Human-readable dependency name (e.g. `"database"`).
        dependency: &'static str,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Parse(_) => 1001,
            Self::Config(_) => 1002,
            Self::Internal(_) => 3000,
            Self::Store(_) => 3001,
            Self::Queue(_) => 3002,
            Self::Connect { .. } => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Parse(_) => StatusCode::BAD_REQUEST,
            Self::Connect { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Queue(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
