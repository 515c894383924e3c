//! Administrative usage reset.
//!
//! Gated by a dedicated secret carried in the request body rather than a
//! session token; the admin credential is not a user account.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::constant_time_eq;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetUsageRequest {
    pub admin_key: String,
    /// Reset a single user when set, all users otherwise.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetUsageResponse {
    pub success: bool,
    pub reset: usize,
    pub message: String,
}

/// `POST /admin/reset-usage` - zero the usage counters.
pub async fn reset_usage(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetUsageRequest>,
) -> Result<Json<ResetUsageResponse>, AppError> {
    let authorized = state
        .config
        .admin_api_secret
        .as_deref()
        .is_some_and(|secret| constant_time_eq(&request.admin_key, secret));
    if !authorized {
        tracing::warn!("admin reset rejected: bad credential");
        return Err(AppError::Auth("Unauthorized".to_string()));
    }

    let reset = state.ledger.reset(request.user_id.as_deref()).await?;

    tracing::info!(reset, user_id = ?request.user_id, "usage counters reset");

    Ok(Json(ResetUsageResponse {
        success: true,
        reset,
        message: format!("Reset {reset} user(s)"),
    }))
}
