//! Voice catalog endpoint.

use axum::Json;
use serde::Serialize;

use crate::core::voices::{DEFAULT_VOICE, VOICES, Voice};

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: &'static [Voice],
    pub default: &'static str,
}

/// `GET /voices` - list the available voices and the default.
pub async fn list_voices() -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: VOICES,
        default: DEFAULT_VOICE,
    })
}
