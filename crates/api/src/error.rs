//! API error types with HTTP response mapping.

use audit::AuditError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::NotFoundByOrder(_) | AuditError::NotFoundByTransaction(_) => {
                ApiError::NotFound(err.to_string())
            }
            AuditError::MissingFilters => ApiError::BadRequest(err.to_string()),
            AuditError::Database(_) | AuditError::Migration(_) | AuditError::Serialization(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        match err {
            SagaError::Validation(_) | SagaError::DuplicateTransaction => {
                ApiError::BadRequest(err.to_string())
            }
            SagaError::Store(_) | SagaError::Transport(_) => ApiError::Internal(err.to_string()),
        }
    }
}
