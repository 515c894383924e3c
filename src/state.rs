//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::speech::SpeechClient;
use crate::ledger::UsageLedger;
use crate::storage::AudioStorage;
use crate::store::UserStore;

/// State shared across request handlers via `Arc<AppState>`.
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn UserStore>,
    pub ledger: UsageLedger,
    pub speech: SpeechClient,
    pub storage: AudioStorage,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn UserStore>, storage: AudioStorage) -> Arc<Self> {
        let speech = SpeechClient::new(
            config.gemini_api_url.clone(),
            config.gemini_api_key.clone(),
            config.speech_timeout,
        );
        let ledger = UsageLedger::new(store.clone());
        Arc::new(Self {
            config,
            store,
            ledger,
            speech,
            storage,
        })
    }
}
