//! Typed API error for HTTP handlers.
//!
//! Converts domain errors into HTTP responses with a `{"error": "..."}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modrank_core::CoreError;
use modrank_service::SnapshotError;

/// Body message for a snapshot file that does not exist yet.
pub const FILE_NOT_FOUND: &str = "File not found";

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: unparseable query parameter.
    BadRequest(String),
    /// 404 Not Found.
    NotFound(String),
    /// 500 Internal Server Error. Details logged, not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Missing { .. } => Self::NotFound(FILE_NOT_FOUND.to_owned()),
            SnapshotError::UnrecognizedShape(_) => Self::Internal(err.into()),
            SnapshotError::Io { .. } | SnapshotError::Fetch(_) => Self::Internal(err.into()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.into()),
        }
    }
}
