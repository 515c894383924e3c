//! Audio blob storage.
//!
//! Generated audio is written under a per-user key,
//! `{user_id}/{voice}-{timestamp}.wav`, to either an S3 bucket or a local
//! directory depending on configuration. The write is fatal to the request:
//! no audio is returned to the caller without a durable copy.

use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};

use crate::config::ServerConfig;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage path {path}: {source}")]
    InvalidPath {
        path: String,
        source: object_store::path::Error,
    },
    #[error("storage write failed: {0}")]
    Write(#[from] object_store::Error),
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

/// Storage for generated audio files.
#[derive(Clone)]
pub struct AudioStorage {
    store: Arc<dyn ObjectStore>,
    public_base: Option<String>,
}

impl AudioStorage {
    /// Build from configuration: S3 when a bucket is configured (credentials
    /// from the standard AWS environment), local filesystem otherwise.
    pub fn from_config(config: &ServerConfig) -> StorageResult<Self> {
        let store: Arc<dyn ObjectStore> = if let Some(bucket) = &config.audio_bucket {
            let s3 = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            Arc::new(s3)
        } else {
            std::fs::create_dir_all(&config.audio_dir)
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            let fs = LocalFileSystem::new_with_prefix(&config.audio_dir)
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            Arc::new(fs)
        };
        Ok(Self {
            store,
            public_base: config.public_audio_url.clone(),
        })
    }

    pub fn new(store: Arc<dyn ObjectStore>, public_base: Option<String>) -> Self {
        Self { store, public_base }
    }

    /// Object key for one generation: `{user_id}/{voice}-{timestamp}.wav`.
    pub fn audio_object_key(user_id: &str, voice_display_name: &str, timestamp_ms: i128) -> String {
        let clean_voice = voice_display_name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{user_id}/{clean_voice}-{timestamp_ms}.wav")
    }

    /// Write an audio blob and return its public URL (the bare key when no
    /// public base URL is configured).
    pub async fn put_wav(&self, key: &str, bytes: Bytes) -> StorageResult<String> {
        let path = ObjectPath::parse(key).map_err(|source| StorageError::InvalidPath {
            path: key.to_string(),
            source,
        })?;
        self.store.put(&path, PutPayload::from(bytes)).await?;
        Ok(match &self.public_base {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => key.to_string(),
        })
    }
}
