//! SpeechClient behavior against a mocked upstream.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voiceover_gateway::{SpeechClient, SpeechError};

const TTS_PATH: &str = "/v1beta/models/gemini-2.5-pro-preview-tts:generateContent";

fn client(server: &MockServer) -> SpeechClient {
    SpeechClient::new(
        server.uri(),
        Some("test-api-key".to_string()),
        Duration::from_secs(5),
    )
}

fn inline_body(mime: &str, payload: &[u8]) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{
                    "inlineData": { "mimeType": mime, "data": BASE64.encode(payload) }
                }]
            }
        }]
    })
}

#[tokio::test]
async fn test_sends_key_header_and_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Orus" } }
                }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(inline_body("audio/L16;codec=pcm;rate=24000", &[0u8; 16])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let audio = client(&server).generate("Hello", "Orus", 1.0).await.unwrap();
    assert_eq!(audio.len(), 44 + 16);
}

#[tokio::test]
async fn test_raw_pcm_is_wav_wrapped() {
    let server = MockServer::start().await;
    let pcm = vec![9u8; 480];
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(inline_body("audio/L16;codec=pcm;rate=24000", &pcm)),
        )
        .mount(&server)
        .await;

    let audio = client(&server).generate("hi", "Orus", 1.0).await.unwrap();
    assert_eq!(&audio[0..4], b"RIFF");
    assert_eq!(&audio[8..12], b"WAVE");
    assert_eq!(&audio[44..], &pcm[..]);
    // Sample rate from the format descriptor lands in the header
    assert_eq!(u32::from_le_bytes(audio[24..28].try_into().unwrap()), 24_000);
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate("hi", "Orus", 1.0).await.unwrap_err();
    match err {
        SpeechError::Unauthorized(message) => assert_eq!(message, "API key not valid"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate("hi", "Orus", 1.0).await.unwrap_err();
    assert!(matches!(err, SpeechError::RateLimited(_)));
}

#[tokio::test]
async fn test_upstream_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).generate("hi", "Orus", 1.0).await.unwrap_err();
    match err {
        SpeechError::UpstreamStatus { status, message } => {
            assert_eq!(status, 503);
            // Unparseable body falls back to the status line
            assert!(message.contains("503"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client(&server).generate("hi", "Orus", 1.0).await.unwrap_err();
    assert!(matches!(err, SpeechError::EmptyResponse));
}

#[tokio::test]
async fn test_timeout_surfaces_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(inline_body("audio/L16;rate=24000", &[0u8; 4]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = SpeechClient::new(
        server.uri(),
        Some("test-api-key".to_string()),
        Duration::from_millis(100),
    );
    let err = client.generate("hi", "Orus", 1.0).await.unwrap_err();
    assert!(matches!(err, SpeechError::Http(_)));
}

#[tokio::test]
async fn test_model_override_changes_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1beta/models/gemini-2.5-flash-preview-tts:generateContent",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(inline_body("audio/L16;rate=24000", &[0u8; 4])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).with_model("gemini-2.5-flash-preview-tts");
    client.generate("hi", "Orus", 1.0).await.unwrap();
}
