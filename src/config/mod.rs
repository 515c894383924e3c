//! Server configuration.
//!
//! Configuration comes from environment variables (with `.env` support via
//! dotenvy in `main`). Every field has a default suitable for local
//! development except the speech API key, which has no safe default and
//! simply stays unset until provided.
//!
//! # Variables
//!
//! | Variable | Default | Purpose |
//! |---|---|---|
//! | `HOST` / `PORT` | `0.0.0.0` / `8080` | bind address |
//! | `GEMINI_API_KEY` | unset | upstream speech credential |
//! | `GEMINI_API_URL` | Google endpoint | upstream base URL (test seam) |
//! | `SPEECH_TIMEOUT_SECS` | `60` | bound on the upstream call |
//! | `JWT_SECRET` | random per process | session token signing key |
//! | `ADMIN_API_SECRET` | unset | admin reset credential |
//! | `USERS_FILE` | `data/users.json` | user store location |
//! | `AUDIO_BUCKET` | unset | S3 bucket for audio blobs |
//! | `AUDIO_DIR` | `data/audio` | local blob directory when no bucket |
//! | `PUBLIC_AUDIO_URL` | unset | public base URL for stored audio |
//! | `ENVIRONMENT` | `development` | `production` hides upstream detail |
//! | `CORS_ALLOWED_ORIGINS` | unset | `*` or comma-separated origins |
//! | `RATE_LIMIT_RPS` / `RATE_LIMIT_BURST` | `50` / `100` | per-IP limits |

use std::path::PathBuf;
use std::time::Duration;

use crate::core::speech::GEMINI_API_URL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Server configuration, shared through `AppState`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Upstream speech API
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub speech_timeout: Duration,

    // Authentication
    pub jwt_secret: String,
    pub admin_api_secret: Option<String>,

    // Persistence
    pub users_file: PathBuf,
    /// S3 bucket for audio blobs; local filesystem storage when unset.
    pub audio_bucket: Option<String>,
    pub audio_dir: PathBuf,
    /// Public base URL prefixed to stored audio paths.
    pub public_audio_url: Option<String>,

    // Behavior toggles
    /// Include raw upstream error detail in 500 responses (non-production).
    pub expose_upstream_errors: bool,

    // Security settings
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: u32,
    pub rate_limit_burst_size: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_or("ENVIRONMENT", "development");

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!(
                    "JWT_SECRET not set; using a random per-process secret. \
                     Sessions will not survive a restart."
                );
                uuid::Uuid::new_v4().to_string()
            }
        };

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 8080)?,
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_api_url: env_or("GEMINI_API_URL", GEMINI_API_URL),
            speech_timeout: Duration::from_secs(parse_env("SPEECH_TIMEOUT_SECS", 60u64)?),
            jwt_secret,
            admin_api_secret: env_opt("ADMIN_API_SECRET"),
            users_file: PathBuf::from(env_or("USERS_FILE", "data/users.json")),
            audio_bucket: env_opt("AUDIO_BUCKET"),
            audio_dir: PathBuf::from(env_or("AUDIO_DIR", "data/audio")),
            public_audio_url: env_opt("PUBLIC_AUDIO_URL"),
            expose_upstream_errors: environment != "production",
            cors_allowed_origins: env_opt("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: parse_env("RATE_LIMIT_RPS", 50u32)?,
            rate_limit_burst_size: parse_env("RATE_LIMIT_BURST", 100u32)?,
        })
    }

    /// Bind address as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuration suitable for tests: local paths, no upstream key,
    /// deterministic secrets.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            gemini_api_key: None,
            gemini_api_url: GEMINI_API_URL.to_string(),
            speech_timeout: Duration::from_secs(5),
            jwt_secret: "test-secret".to_string(),
            admin_api_secret: None,
            users_file: PathBuf::from("users.json"),
            audio_bucket: None,
            audio_dir: PathBuf::from("audio"),
            public_audio_url: None,
            expose_upstream_errors: true,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 50,
            rate_limit_burst_size: 100,
        }
    }
}

fn env_opt(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

fn env_or(var: &str, default: &str) -> String {
    env_opt(var).unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env_opt(var) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_formatting() {
        let mut config = ServerConfig::for_tests();
        config.host = "0.0.0.0".to_string();
        config.port = 8080;
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_test_config_exposes_upstream_errors() {
        assert!(ServerConfig::for_tests().expose_upstream_errors);
    }
}
