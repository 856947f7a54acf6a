//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::pipeline::gateway::GatewayError;
use crate::pipeline::processor::{ImportError, PendingWrites};
use crate::pipeline::storage::StorageError;
use crate::pipeline::structuring::StructuringError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Writes to replay through `/api/documents/resume`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingWrites>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
    #[error("Upstream timed out: {0}")]
    UpstreamTimeout(String),
    #[error("Client store unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Partial write for {client_id}: {reason}")]
    PartialWrite {
        client_id: String,
        reason: String,
        pending: Box<PendingWrites>,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut pending = None;
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail),
            ApiError::Unprocessable(detail) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE", detail)
            }
            ApiError::Upstream(detail) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", detail),
            ApiError::UpstreamTimeout(detail) => {
                (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT", detail)
            }
            ApiError::StorageUnavailable(detail) => {
                (StatusCode::BAD_GATEWAY, "STORAGE_UNAVAILABLE", detail)
            }
            ApiError::Storage(detail) => {
                tracing::error!(detail, "Client store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", detail)
            }
            ApiError::PartialWrite {
                client_id,
                reason,
                pending: writes,
            } => {
                pending = Some(*writes);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PARTIAL_WRITE",
                    format!(
                        "Client {client_id} was saved but related records were not ({reason}). Retry to finish."
                    ),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                pending,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(detail) => ApiError::Conflict(detail),
            StorageError::NotFound(detail) => ApiError::NotFound(detail),
            remote @ (StorageError::Connection(_) | StorageError::Remote { .. }) => {
                let detail = remote.to_string();
                tracing::warn!(detail, "Client store rejected or unreachable");
                ApiError::StorageUnavailable(detail)
            }
            local @ (StorageError::Database(_) | StorageError::LockPoisoned) => {
                ApiError::Storage(local.to_string())
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match &err {
            GatewayError::Timeout { .. } => ApiError::UpstreamTimeout(err.notice()),
            _ => ApiError::Upstream(err.notice()),
        }
    }
}

impl From<StructuringError> for ApiError {
    fn from(err: StructuringError) -> Self {
        match err {
            StructuringError::Validation(detail) => ApiError::Unprocessable(detail),
            StructuringError::MalformedResponse(_) => {
                ApiError::Upstream("The AI reply could not be read".into())
            }
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Extraction(e) => ApiError::Unprocessable(e.to_string()),
            ImportError::Gateway(e) => e.into(),
            ImportError::Structuring(e) => e.into(),
            ImportError::CircuitOpen => ApiError::Upstream(ImportError::CircuitOpen.to_string()),
            ImportError::Storage(e) => e.into(),
            ImportError::PartialWrite {
                client_id,
                pending,
                source,
            } => ApiError::PartialWrite {
                client_id,
                reason: source.to_string(),
                pending,
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Storage(e) => e.into(),
            CoreError::InvalidKey => ApiError::BadRequest(CoreError::InvalidKey.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
