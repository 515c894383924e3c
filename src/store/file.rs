//! JSON-file-backed user store.
//!
//! Demo deployments run from a single `users.json` next to the binary. All
//! reads and writes go through one `RwLock`, and mutations persist the file
//! before releasing the write lock, so the guarded usage increment is atomic
//! with respect to other requests in this process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    GenerationRecord, IncrementOutcome, StoreResult, User, UserStatus, UserStore,
};
use crate::auth::hash_password;

/// Number of demo accounts created by `seed`.
const DEMO_USER_COUNT: usize = 10;

/// Plan default generation limit for demo accounts.
const DEMO_MAX_USAGE: u32 = 3;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct StoreData {
    users: Vec<User>,
    #[serde(default)]
    generations: Vec<GenerationRecord>,
}

/// File-backed [`UserStore`] implementation.
pub struct FileStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl FileStore {
    /// Open an existing store file, or start empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            StoreData::default()
        };
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Create the demo user file: `demo1..demo10` with generated passwords,
    /// `max_usage = 3`, and the temperature entitlement on `demo1` only.
    ///
    /// Returns the plaintext credentials so the operator can hand them out;
    /// only the digests are persisted.
    pub fn seed(path: impl AsRef<Path>) -> StoreResult<Vec<(String, String)>> {
        let now = OffsetDateTime::now_utc();
        let mut credentials = Vec::with_capacity(DEMO_USER_COUNT);
        let mut users = Vec::with_capacity(DEMO_USER_COUNT);

        for n in 1..=DEMO_USER_COUNT {
            let email = format!("demo{n}@voiceover.dev");
            let password = generate_password();
            users.push(User {
                id: Uuid::new_v4().to_string(),
                email: email.clone(),
                password_digest: hash_password(&password),
                current_usage: 0,
                max_usage: DEMO_MAX_USAGE,
                custom_limit: None,
                status: UserStatus::Active,
                can_set_temperature: n == 1,
                updated_at: now,
            });
            credentials.push((email, password));
        }

        let data = StoreData {
            users,
            generations: Vec::new(),
        };
        let raw = serde_json::to_string_pretty(&data)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, raw)?;
        Ok(credentials)
    }

    /// Number of user records currently loaded.
    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    // Caller must hold the write lock for the mutation this persists.
    fn persist(&self, data: &StoreData) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// 16-character random password for demo accounts.
fn generate_password() -> String {
    let raw = format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    );
    raw.chars().take(16).collect()
}

#[async_trait]
impl UserStore for FileStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.data.read();
        Ok(data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get(&self, user_id: &str) -> StoreResult<Option<User>> {
        let data = self.data.read();
        Ok(data.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn increment_usage_if_below(&self, user_id: &str) -> StoreResult<IncrementOutcome> {
        let mut data = self.data.write();
        let Some(user) = data.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(IncrementOutcome::NotFound);
        };
        if user.current_usage >= user.effective_limit() {
            return Ok(IncrementOutcome::LimitReached);
        }
        user.current_usage += 1;
        user.updated_at = OffsetDateTime::now_utc();
        let new_count = user.current_usage;
        self.persist(&data)?;
        Ok(IncrementOutcome::Updated(new_count))
    }

    async fn reset_usage(&self, user_id: Option<&str>) -> StoreResult<usize> {
        let mut data = self.data.write();
        let now = OffsetDateTime::now_utc();
        let mut reset = 0;
        for user in data.users.iter_mut() {
            if user_id.is_none_or(|id| user.id == id) {
                user.current_usage = 0;
                user.updated_at = now;
                reset += 1;
            }
        }
        if reset > 0 {
            self.persist(&data)?;
        }
        Ok(reset)
    }

    async fn insert_generation(&self, record: GenerationRecord) -> StoreResult<()> {
        let mut data = self.data.write();
        data.generations.push(record);
        self.persist(&data)?;
        Ok(())
    }

    async fn generations_for_user(&self, user_id: &str) -> StoreResult<Vec<GenerationRecord>> {
        let data = self.data.read();
        let mut records: Vec<_> = data
            .generations
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}
