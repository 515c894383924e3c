//! Speech generation client for the Gemini TTS API.

mod client;
pub mod messages;

pub use client::{DEFAULT_TTS_MODEL, GEMINI_API_URL, SpeechClient, SpeechError, SpeechResult};
