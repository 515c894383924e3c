//! HTTP client for the Gemini TTS API.
//!
//! One outbound request per generation; no internal retries. Retry policy,
//! if any, belongs to the caller.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;

use super::messages::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};
use crate::core::audio::{self, AudioError, WavParams};

/// Default Gemini API base URL.
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default TTS model.
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-pro-preview-tts";

pub type SpeechResult<T> = Result<T, SpeechError>;

/// Failures of a single speech generation call.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// No API credential configured; the request was never sent.
    #[error("speech API key is not configured")]
    MissingApiKey,

    /// The upstream service rejected our credential.
    #[error("speech API rejected the configured credential: {0}")]
    Unauthorized(String),

    /// The upstream service reported rate or usage limiting.
    #[error("speech API rate limit reached: {0}")]
    RateLimited(String),

    /// Any other non-success status from the upstream service.
    #[error("speech API returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// Transport-level failure (connect, timeout, body read).
    #[error("speech API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response contained no audio payload.
    #[error("no audio data in speech API response")]
    EmptyResponse,

    /// The response payload could not be decoded or encapsulated.
    #[error("invalid audio payload: {0}")]
    InvalidPayload(String),
}

impl From<AudioError> for SpeechError {
    fn from(e: AudioError) -> Self {
        SpeechError::InvalidPayload(e.to_string())
    }
}

/// Client for the Gemini speech generation endpoint.
///
/// The base URL is configurable so tests can point the client at a local
/// mock server.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl SpeechClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: DEFAULT_TTS_MODEL.to_string(),
        }
    }

    /// Override the model name (e.g. for a flash-tier TTS model).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Generate speech for `text` with the given prebuilt voice.
    ///
    /// Returns a playable audio buffer: payloads already declared as a
    /// playable container pass through unchanged, bare PCM is wrapped in a
    /// WAV header using the parameters from the payload's format descriptor.
    pub async fn generate(
        &self,
        text: &str,
        voice_name: &str,
        temperature: f32,
    ) -> SpeechResult<Bytes> {
        let api_key = self.api_key.as_deref().ok_or(SpeechError::MissingApiKey)?;

        let request = GenerateContentRequest::speech(text, voice_name, temperature);

        tracing::debug!(
            voice = %voice_name,
            temperature,
            chars = text.len(),
            "sending speech generation request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SpeechError::Unauthorized(message)
                }
                StatusCode::TOO_MANY_REQUESTS => SpeechError::RateLimited(message),
                _ => SpeechError::UpstreamStatus {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        normalize_audio(&body)
    }
}

/// Pull a human-readable message out of an upstream error body.
async fn read_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorResponse>().await {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => format!("HTTP {status}"),
    }
}

/// Collect inline audio parts into a single playable buffer.
///
/// The API may split audio across several parts; their PCM bytes are
/// concatenated before encapsulation so the result carries one header.
fn normalize_audio(body: &GenerateContentResponse) -> SpeechResult<Bytes> {
    let mut mime: Option<&str> = None;
    let mut data = Vec::new();

    for candidate in &body.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            if let Some(inline) = &part.inline_data {
                let chunk = BASE64
                    .decode(&inline.data)
                    .map_err(|e| SpeechError::InvalidPayload(e.to_string()))?;
                mime.get_or_insert(inline.mime_type.as_str());
                data.extend_from_slice(&chunk);
            } else if let Some(text) = &part.text {
                tracing::warn!(text = %text, "speech API returned text instead of audio");
            }
        }
    }

    let Some(mime) = mime else {
        return Err(SpeechError::EmptyResponse);
    };
    if data.is_empty() {
        return Err(SpeechError::EmptyResponse);
    }

    if audio::is_playable_container(mime) {
        return Ok(Bytes::from(data));
    }

    let params = WavParams::from_mime(mime)?;
    Ok(Bytes::from(audio::encode_wav(params, &data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::speech::messages::{Candidate, Content, InlineData, Part};

    fn inline_response(mime: &str, payload: &[u8]) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime.to_string(),
                            data: BASE64.encode(payload),
                        }),
                    }],
                }),
            }],
        }
    }

    #[test]
    fn test_missing_api_key() {
        let client = SpeechClient::new(GEMINI_API_URL, None, Duration::from_secs(5));
        let err = tokio_test::block_on(client.generate("hi", "Orus", 1.0)).unwrap_err();
        assert!(matches!(err, SpeechError::MissingApiKey));
    }

    #[test]
    fn test_normalize_raw_pcm_gets_wav_header() {
        let pcm = vec![1u8, 2, 3, 4];
        let body = inline_response("audio/L16;codec=pcm;rate=24000", &pcm);
        let audio = normalize_audio(&body).unwrap();
        assert_eq!(audio.len(), 44 + pcm.len());
        assert_eq!(&audio[0..4], b"RIFF");
        assert_eq!(&audio[44..], &pcm[..]);
    }

    #[test]
    fn test_normalize_container_passthrough() {
        let wav = crate::core::audio::encode_wav(WavParams::default(), &[0u8; 8]);
        let body = inline_response("audio/wav", &wav);
        let audio = normalize_audio(&body).unwrap();
        assert_eq!(&audio[..], &wav[..]);
    }

    #[test]
    fn test_normalize_concatenates_parts() {
        let mut body = inline_response("audio/L16;rate=24000", &[1, 2]);
        body.candidates[0]
            .content
            .as_mut()
            .unwrap()
            .parts
            .push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: "audio/L16;rate=24000".to_string(),
                    data: BASE64.encode([3, 4]),
                }),
            });
        let audio = normalize_audio(&body).unwrap();
        assert_eq!(&audio[44..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_normalize_empty_response() {
        let body = GenerateContentResponse { candidates: vec![] };
        assert!(matches!(
            normalize_audio(&body),
            Err(SpeechError::EmptyResponse)
        ));
    }

    #[test]
    fn test_normalize_text_only_response() {
        let body = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: None,
                    parts: vec![Part {
                        text: Some("cannot comply".to_string()),
                        inline_data: None,
                    }],
                }),
            }],
        };
        assert!(matches!(
            normalize_audio(&body),
            Err(SpeechError::EmptyResponse)
        ));
    }

    #[test]
    fn test_endpoint_building() {
        let client = SpeechClient::new(
            "http://localhost:9999/",
            Some("k".to_string()),
            Duration::from_secs(5),
        );
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-pro-preview-tts:generateContent"
        );
    }
}
