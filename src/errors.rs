//! Centralized error types for consistent API error handling.
//!
//! Every boundary failure is logged through tracing and serialized as a
//! `{"error": "..."}` body with a status matching the failure class.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::protocol::ErrorOut;

/// Failures surfaced at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unreadable or structurally unusable upload.
    #[error("{0}")]
    Ingest(String),

    /// Malformed or empty client payload.
    #[error("{0}")]
    Validation(String),

    /// Unknown session or resource.
    #[error("{0}")]
    NotFound(String),

    /// Session time budget exceeded. The session is preserved; only new
    /// submissions are rejected until the next upload.
    #[error("{0}")]
    Timeout(String),

    /// Assistant collaborator unavailable or failing upstream.
    #[error("{0}")]
    Assistant(String),

    /// Unexpected internal failure, reported generically to the caller.
    #[error("{0}")]
    Internal(String),
}

/// Ingestion failures, produced below the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read file: {0}")]
    Unreadable(String),

    #[error("undetermined delimiter: use ';', ',', tab or '|'")]
    UndeterminedDelimiter,
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Ingest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Assistant(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(_) | ApiError::Assistant(_) => {
                error!(target: "adaptiq_backend", %status, error = %self, "Request failed")
            }
            _ => warn!(target: "adaptiq_backend", %status, error = %self, "Request rejected"),
        }
        (status, Json(ErrorOut { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            ApiError::Ingest("bad file".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("nope".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Timeout("late".into()).status(),
            StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            ApiError::Assistant("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn ingest_error_converts_with_message() {
        let api: ApiError = IngestError::UndeterminedDelimiter.into();
        assert!(matches!(api, ApiError::Ingest(_)));
        assert!(api.to_string().contains("undetermined delimiter"));
    }
}
