//! # cardsync
//!
//! Offline-first synchronization engine for contact-card records:
//! - Local SQLite store mirroring the remote card service
//! - Remote HTTP client with a strict connectivity/protocol error split
//! - Pure completeness classifier applied before every persist
//! - Synchronizer implementing the fetch-with-fallback and
//!   local-durability-first policies
//! - Bounded worker pool keeping every operation off the caller's thread
//!
//! ```rust,ignore
//! let config = EngineConfig::load()?;
//! let sync = start(&config).await?;
//! let cards = sync.fetch_cards(0, 50, "").await?;
//! ```

pub mod card;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod remote;
pub mod sync;

pub use card::{Card, Completeness, Statistics};
pub use classify::classify;
pub use config::EngineConfig;
pub use error::{Result, SyncError};
pub use executor::{TaskHandle, TaskPool};
pub use sync::{DeleteOutcome, Synchronizer};

use std::sync::Arc;

/// Construct the engine from a resolved configuration: open (or create)
/// the local database, build the remote client, and start the worker
/// pool. Logs the remote's reachability once at startup.
pub async fn start(config: &EngineConfig) -> Result<Synchronizer> {
    let pool = db::init_database(&config.database_path).await?;
    let store = Arc::new(db::SqliteStore::new(pool));
    let remote = Arc::new(remote::HttpRemote::new(
        &config.base_url,
        config.request_timeout(),
    )?);

    let sync = Synchronizer::new(store, remote, config.worker_count);
    // Diagnostics only; the engine works offline from the first call
    let _ = sync.check_remote().await;
    Ok(sync)
}
