//! Per-user generation quota tracking.
//!
//! The ledger separates the quota *gate* from the quota *charge*: requests
//! are gated on a plain read before the upstream call, and charged with a
//! store-level guarded increment only after a successful generation. Failed
//! generations are never charged. The guarded increment means the persisted
//! count can never exceed the effective limit even under concurrent
//! requests; at worst two in-flight requests at the last slot both generate
//! and the ledger undercounts by one, which only ever favors the user.

use std::sync::Arc;

use serde::Serialize;

use crate::store::{IncrementOutcome, StoreResult, User, UserStatus, UserStore};

/// Read-only view of a user's quota position.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UsageSnapshot {
    pub current: u32,
    pub effective_limit: u32,
    pub status: UserStatus,
}

impl UsageSnapshot {
    pub fn of(user: &User) -> Self {
        Self {
            current: user.current_usage,
            effective_limit: user.effective_limit(),
            status: user.status,
        }
    }

    /// Whether a generation request may proceed.
    pub fn may_generate(&self) -> bool {
        self.status == UserStatus::Active && self.current < self.effective_limit
    }
}

/// Usage ledger over the user-record store.
#[derive(Clone)]
pub struct UsageLedger {
    store: Arc<dyn UserStore>,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Current usage vs. limit for a user; `None` if the user is unknown.
    pub async fn usage(&self, user_id: &str) -> StoreResult<Option<UsageSnapshot>> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .map(|user| UsageSnapshot::of(&user)))
    }

    /// Charge one generation. Returns the new count, or `None` when the
    /// store-level guard refused (limit already reached, or the user
    /// vanished between the gate and the charge).
    pub async fn commit(&self, user_id: &str) -> StoreResult<Option<u32>> {
        match self.store.increment_usage_if_below(user_id).await? {
            IncrementOutcome::Updated(count) => Ok(Some(count)),
            IncrementOutcome::LimitReached | IncrementOutcome::NotFound => Ok(None),
        }
    }

    /// Administrative reset of one or all users; returns how many were reset.
    pub async fn reset(&self, user_id: Option<&str>) -> StoreResult<usize> {
        self.store.reset_usage(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;

    async fn ledger_with_user() -> (tempfile::TempDir, UsageLedger, User) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        FileStore::seed(&path).unwrap();
        let store = Arc::new(FileStore::open(&path).unwrap());
        let user = store
            .find_by_email("demo1@voiceover.dev")
            .await
            .unwrap()
            .unwrap();
        (dir, UsageLedger::new(store), user)
    }

    #[tokio::test]
    async fn test_snapshot_gate() {
        let active = UsageSnapshot {
            current: 2,
            effective_limit: 3,
            status: UserStatus::Active,
        };
        assert!(active.may_generate());

        let exhausted = UsageSnapshot {
            current: 3,
            effective_limit: 3,
            status: UserStatus::Active,
        };
        assert!(!exhausted.may_generate());

        let inactive = UsageSnapshot {
            current: 0,
            effective_limit: 3,
            status: UserStatus::Inactive,
        };
        assert!(!inactive.may_generate());
    }

    #[tokio::test]
    async fn test_commit_until_limit() {
        let (_dir, ledger, user) = ledger_with_user().await;
        assert_eq!(ledger.commit(&user.id).await.unwrap(), Some(1));
        assert_eq!(ledger.commit(&user.id).await.unwrap(), Some(2));
        assert_eq!(ledger.commit(&user.id).await.unwrap(), Some(3));
        assert_eq!(ledger.commit(&user.id).await.unwrap(), None);

        let snapshot = ledger.usage(&user.id).await.unwrap().unwrap();
        assert_eq!(snapshot.current, 3);
        assert!(!snapshot.may_generate());
    }

    #[tokio::test]
    async fn test_usage_unknown_user() {
        let (_dir, ledger, _) = ledger_with_user().await;
        assert!(ledger.usage("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_restores_quota() {
        let (_dir, ledger, user) = ledger_with_user().await;
        ledger.commit(&user.id).await.unwrap();
        ledger.commit(&user.id).await.unwrap();

        assert_eq!(ledger.reset(Some(&user.id)).await.unwrap(), 1);
        let snapshot = ledger.usage(&user.id).await.unwrap().unwrap();
        assert_eq!(snapshot.current, 0);
    }
}
