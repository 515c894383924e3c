//! HTTP request handlers.
//!
//! - `auth`: login, session issuance
//! - `speak`: the generation orchestrator
//! - `voices`: voice catalog listing
//! - `admin`: usage reset

pub mod admin;
pub mod auth;
pub mod speak;
pub mod voices;

use axum::Json;
use serde_json::{Value, json};

/// `GET /` - liveness check.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
