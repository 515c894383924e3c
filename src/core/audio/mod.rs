//! WAV encapsulation for raw PCM audio.
//!
//! The speech API returns linear PCM with a MIME-style format descriptor
//! such as `audio/L16;codec=pcm;rate=24000`. Browsers cannot play bare PCM,
//! so the payload is prefixed with the canonical 44-byte RIFF/WAVE header
//! before it is stored or returned.
//!
//! Header layout (<http://soundfile.sapp.org/doc/WaveFormat>):
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  36 + data length (LE)
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  16 (PCM format chunk size)
//!     20     2  1 (uncompressed PCM)
//!     22     2  channel count
//!     24     4  sample rate
//!     28     4  byte rate
//!     32     2  block align
//!     34     2  bits per sample
//!     36     4  "data"
//!     40     4  data length (LE)
//! ```

use thiserror::Error;

/// Size of the RIFF/WAVE header prepended to PCM data.
pub const WAV_HEADER_LEN: usize = 44;

/// MIME types the gateway passes through without re-encapsulation.
const PLAYABLE_CONTAINERS: &[&str] = &[
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/mpeg",
    "audio/mp3",
    "audio/ogg",
    "audio/flac",
    "audio/aac",
];

/// Errors raised while interpreting a PCM format descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("invalid bit depth in format descriptor: {0}")]
    InvalidBitDepth(String),
    #[error("invalid sample rate in format descriptor: {0}")]
    InvalidSampleRate(String),
}

/// PCM parameters needed to build a WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavParams {
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl Default for WavParams {
    /// Defaults match what the speech API emits when the descriptor is
    /// silent: mono, 24 kHz, 16-bit.
    fn default() -> Self {
        Self {
            num_channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
        }
    }
}

impl WavParams {
    /// Parse PCM parameters from a MIME-style format descriptor.
    ///
    /// A format token with a trailing integer (`L16`, `L24`) overrides the
    /// default bit depth; a `rate=<n>` parameter overrides the sample rate.
    /// Unrecognized parameters are ignored, but a malformed numeric value in
    /// a recognized position is rejected.
    pub fn from_mime(mime: &str) -> Result<Self, AudioError> {
        let mut params = Self::default();

        let mut segments = mime.split(';').map(str::trim);
        let file_type = segments.next().unwrap_or_default();

        // "audio/L16" -> subtype "L16" -> bit depth 16
        if let Some(subtype) = file_type.split('/').nth(1) {
            let digits: String = subtype
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                params.bits_per_sample = digits
                    .parse()
                    .map_err(|_| AudioError::InvalidBitDepth(subtype.to_string()))?;
            }
        }

        for segment in segments {
            if let Some((key, value)) = segment.split_once('=') {
                if key.trim().eq_ignore_ascii_case("rate") {
                    params.sample_rate = value
                        .trim()
                        .parse()
                        .map_err(|_| AudioError::InvalidSampleRate(value.to_string()))?;
                }
            }
        }

        Ok(params)
    }

    /// Bytes consumed per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.num_channels) * u32::from(self.bits_per_sample) / 8
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.num_channels * self.bits_per_sample / 8
    }
}

/// Whether the declared MIME type is already a playable container.
///
/// The upstream API sometimes reports an encapsulated format and sometimes
/// bare PCM; callers branch on the declared type rather than assuming one.
pub fn is_playable_container(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    PLAYABLE_CONTAINERS
        .iter()
        .any(|c| essence.eq_ignore_ascii_case(c))
}

/// Prepend a RIFF/WAVE header to raw PCM data.
///
/// Pure function; the output is always `44 + pcm.len()` bytes.
pub fn encode_wav(params: WavParams, pcm: &[u8]) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&params.num_channels.to_le_bytes());
    out.extend_from_slice(&params.sample_rate.to_le_bytes());
    out.extend_from_slice(&params.byte_rate().to_le_bytes());
    out.extend_from_slice(&params.block_align().to_le_bytes());
    out.extend_from_slice(&params.bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);

    out
}
