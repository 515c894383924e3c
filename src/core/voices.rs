//! Fixed catalog of prebuilt speech voices.
//!
//! The upstream TTS model ships a closed set of named voices; the gateway
//! exposes ten of them. Requests are validated against this catalog before
//! any upstream call is made.

use serde::Serialize;

/// Default voice when a request does not name one.
pub const DEFAULT_VOICE: &str = "orus";

/// Gender tag attached to each catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
}

/// A catalog entry for one prebuilt voice.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Voice {
    /// Identifier clients send in requests (lowercase).
    pub name: &'static str,
    /// Voice name as the upstream API expects it.
    pub api_name: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    pub gender: VoiceGender,
    /// Inactive voices stay listed but reject generation requests.
    pub is_active: bool,
}

/// The ten voices offered by the service.
pub const VOICES: &[Voice] = &[
    Voice {
        name: "orus",
        api_name: "Orus",
        display_name: "Orus",
        gender: VoiceGender::Male,
        is_active: true,
    },
    Voice {
        name: "zephyr",
        api_name: "Zephyr",
        display_name: "Zephyr",
        gender: VoiceGender::Female,
        is_active: true,
    },
    Voice {
        name: "puck",
        api_name: "Puck",
        display_name: "Puck",
        gender: VoiceGender::Male,
        is_active: true,
    },
    Voice {
        name: "charon",
        api_name: "Charon",
        display_name: "Charon",
        gender: VoiceGender::Male,
        is_active: true,
    },
    Voice {
        name: "kore",
        api_name: "Kore",
        display_name: "Kore",
        gender: VoiceGender::Female,
        is_active: true,
    },
    Voice {
        name: "fenrir",
        api_name: "Fenrir",
        display_name: "Fenrir",
        gender: VoiceGender::Male,
        is_active: true,
    },
    Voice {
        name: "leda",
        api_name: "Leda",
        display_name: "Leda",
        gender: VoiceGender::Female,
        is_active: true,
    },
    Voice {
        name: "aoede",
        api_name: "Aoede",
        display_name: "Aoede",
        gender: VoiceGender::Female,
        is_active: true,
    },
    Voice {
        name: "enceladus",
        api_name: "Enceladus",
        display_name: "Enceladus",
        gender: VoiceGender::Male,
        is_active: true,
    },
    Voice {
        name: "callirrhoe",
        api_name: "Callirrhoe",
        display_name: "Callirrhoe",
        gender: VoiceGender::Female,
        is_active: true,
    },
];

/// Look up a voice by its request identifier, case-insensitively.
///
/// Returns `None` for unknown names; callers decide how to treat inactive
/// entries.
pub fn find_voice(name: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.name.eq_ignore_ascii_case(name))
}

/// Resolve the requested voice for a generation request.
///
/// `None` falls back to the default voice; unknown or inactive voices are
/// rejected with the offending name.
pub fn resolve_voice(requested: Option<&str>) -> Result<&'static Voice, String> {
    let name = requested.unwrap_or(DEFAULT_VOICE);
    match find_voice(name) {
        Some(voice) if voice.is_active => Ok(voice),
        Some(_) => Err(name.to_string()),
        None => Err(name.to_string()),
    }
}
