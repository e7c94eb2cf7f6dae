//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by request handlers.
///
/// Every variant maps to `500 Internal Server Error`; the kind is only
/// reported in logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to load sensor readings: {0}")]
    Storage(#[from] StorageError),

    #[error("sensor readings task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// Diagnostic category
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Storage(err) => err.kind().as_str(),
            ApiError::Task(_) => "task",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(kind = self.kind(), "{}", self);
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
