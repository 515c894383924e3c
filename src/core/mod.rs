pub mod audio;
pub mod speech;
pub mod voices;

// Re-export commonly used types for convenience
pub use audio::{AudioError, WAV_HEADER_LEN, WavParams, encode_wav, is_playable_container};
pub use speech::{SpeechClient, SpeechError, SpeechResult};
pub use voices::{DEFAULT_VOICE, VOICES, Voice, VoiceGender, find_voice, resolve_voice};
