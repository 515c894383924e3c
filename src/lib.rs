pub mod auth;
pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use core::speech::{SpeechClient, SpeechError};
pub use errors::{AppError, AppResult, AuthError};
pub use ledger::{UsageLedger, UsageSnapshot};
pub use state::AppState;
pub use storage::AudioStorage;
pub use store::{FileStore, GenerationRecord, User, UserStatus, UserStore};
