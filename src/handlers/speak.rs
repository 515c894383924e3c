//! Speech generation endpoint: the end-to-end request orchestrator.
//!
//! The request walks a fixed gate sequence: session (middleware), user
//! record, account status, quota, voice, then the upstream call, the blob
//! write, and finally the best-effort bookkeeping (generation log, usage
//! charge). Gates abort with no side effects; the blob write is the point
//! of no return.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderName, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::Auth;
use crate::core::voices::{self, Voice};
use crate::errors::AppError;
use crate::ledger::UsageSnapshot;
use crate::state::AppState;
use crate::storage::AudioStorage;
use crate::store::{GenerationRecord, User};

/// Temperature used for everyone without the override entitlement.
const DEFAULT_TEMPERATURE: f32 = 1.0;

pub const X_USAGE_COUNT: HeaderName = HeaderName::from_static("x-usage-count");
pub const X_USAGE_LIMIT: HeaderName = HeaderName::from_static("x-usage-limit");
pub const X_GENERATION_ID: HeaderName = HeaderName::from_static("x-generation-id");
pub const X_AUDIO_URL: HeaderName = HeaderName::from_static("x-audio-url");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakRequest {
    pub text: String,
    #[serde(default)]
    pub voice_name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// `POST /speak` - generate a voice-over for the submitted text.
///
/// Returns the WAV bytes directly for immediate playback, with usage
/// metadata in response headers; the file is also kept in blob storage.
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    Json(request): Json<SpeakRequest>,
) -> Result<Response, AppError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }

    // Load the user record and gate on account status and quota.
    let user = state
        .store
        .get(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User data not found".to_string()))?;

    if !user.is_active() {
        return Err(AppError::Forbidden("Account is not active".to_string()));
    }

    let snapshot = UsageSnapshot::of(&user);
    if !snapshot.may_generate() {
        return Err(AppError::QuotaExceeded {
            current: snapshot.current,
            limit: snapshot.effective_limit,
        });
    }

    // Voice must resolve before any upstream call is made.
    let voice = voices::resolve_voice(request.voice_name.as_deref())
        .map_err(|name| AppError::Validation(format!("Voice not found: {name}")))?;

    let temperature = effective_temperature(&user, request.temperature);

    tracing::info!(
        user_id = %user.id,
        voice = %voice.name,
        temperature,
        chars = text.len(),
        "generating speech"
    );

    let audio = state
        .speech
        .generate(text, voice.api_name, temperature)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "speech generation failed");
            if state.config.expose_upstream_errors {
                AppError::Upstream(e.to_string())
            } else {
                AppError::Upstream("Speech generation failed".to_string())
            }
        })?;

    // Durable copy first; no audio is returned without one.
    let completed_at = OffsetDateTime::now_utc();
    let timestamp_ms = completed_at.unix_timestamp_nanos() / 1_000_000;
    let storage_path = AudioStorage::audio_object_key(&user.id, voice.display_name, timestamp_ms);
    let audio_url = state
        .storage
        .put_wav(&storage_path, audio.clone())
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, path = %storage_path, error = %e, "audio upload failed");
            AppError::Persistence("Failed to save audio file".to_string())
        })?;

    // Best-effort bookkeeping from here on: the user gets their audio even
    // if the log insert or the usage charge fails.
    let generation_id = Uuid::new_v4().to_string();
    let record = GenerationRecord {
        id: generation_id.clone(),
        user_id: user.id.clone(),
        voice_name: voice.name.to_string(),
        input_text: text.to_string(),
        char_count: text.chars().count(),
        temperature,
        storage_path: storage_path.clone(),
        audio_url: audio_url.clone(),
        file_size_bytes: audio.len(),
        status: "completed".to_string(),
        completed_at,
    };
    if let Err(e) = state.store.insert_generation(record).await {
        tracing::error!(user_id = %user.id, error = %e, "failed to log generation");
    }

    let usage_count = match state.ledger.commit(&user.id).await {
        Ok(Some(count)) => count,
        Ok(None) => {
            // Guard refused: a concurrent request already took the last slot.
            tracing::warn!(user_id = %user.id, "usage charge refused at limit");
            snapshot.effective_limit
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "failed to update usage");
            snapshot.current + 1
        }
    };

    tracing::info!(
        user_id = %user.id,
        generation_id = %generation_id,
        bytes = audio.len(),
        usage = usage_count,
        "generation completed"
    );

    let headers = [
        (header::CONTENT_TYPE, "audio/wav".to_string()),
        (X_USAGE_COUNT, usage_count.to_string()),
        (X_USAGE_LIMIT, snapshot.effective_limit.to_string()),
        (X_GENERATION_ID, generation_id),
        (X_AUDIO_URL, audio_url),
    ];
    Ok((headers, audio).into_response())
}

/// Only users with the entitlement may pick a temperature; everyone else is
/// silently clamped to the default.
fn effective_temperature(user: &User, requested: Option<f32>) -> f32 {
    if user.can_set_temperature {
        requested.unwrap_or(DEFAULT_TEMPERATURE).clamp(0.0, 2.0)
    } else {
        DEFAULT_TEMPERATURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserStatus;

    fn user(can_set_temperature: bool) -> User {
        User {
            id: "u1".to_string(),
            email: "demo@voiceover.dev".to_string(),
            password_digest: String::new(),
            current_usage: 0,
            max_usage: 3,
            custom_limit: None,
            status: UserStatus::Active,
            can_set_temperature,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_entitled_user_controls_temperature() {
        let u = user(true);
        assert_eq!(effective_temperature(&u, Some(0.4)), 0.4);
        assert_eq!(effective_temperature(&u, None), 1.0);
    }

    #[test]
    fn test_entitled_temperature_clamped_to_range() {
        let u = user(true);
        assert_eq!(effective_temperature(&u, Some(9.0)), 2.0);
        assert_eq!(effective_temperature(&u, Some(-1.0)), 0.0);
    }

    #[test]
    fn test_unentitled_temperature_silently_overridden() {
        let u = user(false);
        assert_eq!(effective_temperature(&u, Some(0.1)), 1.0);
        assert_eq!(effective_temperature(&u, None), 1.0);
    }
}
