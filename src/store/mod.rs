//! User record store.
//!
//! The gateway treats the user database as an external collaborator behind
//! the [`UserStore`] trait: a query/update interface for user records plus
//! an append-only generation log. The shipped implementation
//! ([`file::FileStore`]) keeps everything in a JSON file, which is all a
//! demo deployment needs; a SQL-backed implementation would slot in behind
//! the same trait.

mod file;

pub use file::FileStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures talking to the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Account status; inactive accounts cannot generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// A user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Hex-encoded SHA-256 digest of the password.
    pub password_digest: String,
    pub current_usage: u32,
    /// Plan default generation limit.
    pub max_usage: u32,
    /// Per-user override; takes precedence over `max_usage` when set.
    #[serde(default)]
    pub custom_limit: Option<u32>,
    pub status: UserStatus,
    /// Entitlement: may supply a non-default generation temperature.
    #[serde(default)]
    pub can_set_temperature: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// The limit actually enforced: custom override if set, plan default
    /// otherwise.
    pub fn effective_limit(&self) -> u32 {
        self.custom_limit.unwrap_or(self.max_usage)
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Append-only log entry for one generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub user_id: String,
    pub voice_name: String,
    pub input_text: String,
    pub char_count: usize,
    pub temperature: f32,
    pub storage_path: String,
    pub audio_url: String,
    pub file_size_bytes: usize,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

/// Result of a guarded usage increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The guard matched; carries the new usage count.
    Updated(u32),
    /// `current_usage >= effective_limit`; nothing changed.
    LimitReached,
    /// No such user.
    NotFound,
}

/// Query/update interface over the external user-record store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// Atomically increment `current_usage` by one, but only while it is
    /// below the user's effective limit. The guard and the update happen as
    /// one store operation, so concurrent callers cannot jointly push the
    /// count past the limit.
    async fn increment_usage_if_below(&self, user_id: &str) -> StoreResult<IncrementOutcome>;

    /// Set `current_usage` to zero for one user, or for all users when
    /// `user_id` is `None`. Returns the number of users reset.
    async fn reset_usage(&self, user_id: Option<&str>) -> StoreResult<usize>;

    /// Append a generation log entry.
    async fn insert_generation(&self, record: GenerationRecord) -> StoreResult<()>;

    /// Generation log entries for a user, newest first.
    async fn generations_for_user(&self, user_id: &str) -> StoreResult<Vec<GenerationRecord>>;
}
