//! Request-level error taxonomy.
//!
//! Every failure on the generation path maps to one of these variants; the
//! `IntoResponse` impl turns them into the status code plus a JSON
//! `{"error": ...}` body. Validation and auth failures abort with no side
//! effects; quota and upstream failures abort before any persistence; blob
//! persistence failures are fatal, while generation-log and usage-increment
//! failures are swallowed by the orchestrator (the user still gets audio).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input (unknown voice, empty text, bad JSON).
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session.
    #[error("{0}")]
    Auth(String),

    /// Inactive account or unauthorized administrative action.
    #[error("{0}")]
    Forbidden(String),

    /// Unknown user or resource.
    #[error("{0}")]
    NotFound(String),

    /// Per-user generation limit reached.
    #[error("Generation limit reached ({current}/{limit})")]
    QuotaExceeded { current: u32, limit: u32 },

    /// Speech API failure; the message is already sanitized for the
    /// configured environment.
    #[error("{0}")]
    Upstream(String),

    /// Storage or database write failure.
    #[error("{0}")]
    Persistence(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) | AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
