//! Login endpoint: exchanges demo credentials for a session token.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: String,
    pub email: String,
    pub usage: LoginUsage,
}

#[derive(Debug, Serialize)]
pub struct LoginUsage {
    pub used: u32,
    pub max: u32,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = state
        .store
        .find_by_email(&request.email)
        .await?
        .filter(|u| auth::verify_password(&request.password, &u.password_digest))
        .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

    let token = auth::issue_token(&state.config.jwt_secret, &user.id, &user.email)
        .map_err(|e| AppError::Persistence(e.to_string()))?;

    tracing::info!(user_id = %user.id, "login successful");

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: LoginUser {
            id: user.id.clone(),
            email: user.email.clone(),
            usage: LoginUsage {
                used: user.current_usage,
                max: user.effective_limit(),
            },
        },
    }))
}
