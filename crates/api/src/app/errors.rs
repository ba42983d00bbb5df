use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use stockroom_core::{DomainError, RepositoryError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a handler can fail with, one variant per HTTP outcome.
///
/// Handlers never recover from these; they translate and surface them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, missing/invalid fields, bad lookup parameters.
    #[error("{0}")]
    Validation(String),

    /// Path identifier that is not an integer.
    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    /// Constraint violation or store failure.
    #[error("{0}")]
    Persistence(String),

    /// A list operation exceeded its deadline.
    #[error("operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::InvalidId(_) => "invalid_id",
            ApiError::NotFound(_) => "not_found",
            ApiError::Persistence(_) => "persistence_error",
            ApiError::Timeout(_) => "timeout",
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::Validation(msg) => ApiError::Validation(msg),
            RepositoryError::Constraint(_) | RepositoryError::Database(_) => {
                ApiError::Persistence(err.to_string())
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, code = self.code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "request rejected");
        }
        json_error(status, self.code(), self.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
