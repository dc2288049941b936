//! Engine configuration
//!
//! Resolution priority for every setting:
//! 1. Explicit value from the embedding application (highest)
//! 2. Environment variable (`CARDSYNC_*`)
//! 3. TOML config file (`<config dir>/cardsync/config.toml`)
//! 4. Compiled default (fallback)

use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default remote endpoint (the card service's development address)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8006";

/// Default remote call timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the remote card service
    pub base_url: String,
    /// Path of the local SQLite database
    pub database_path: PathBuf,
    /// Connect/read/write timeout for every remote call
    pub request_timeout_secs: u64,
    /// Task executor width
    pub worker_count: usize,
}

/// Raw, partially specified config file contents
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
    database_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    worker_count: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            database_path: default_database_path(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            worker_count: crate::executor::DEFAULT_WORKERS,
        }
    }
}

impl EngineConfig {
    /// Resolve configuration from environment variables, the TOML config
    /// file, and compiled defaults. Embedders that want full control can
    /// construct the struct directly instead.
    pub fn load() -> Result<Self> {
        let file = load_config_file()?.unwrap_or_default();
        let defaults = Self::default();

        let worker_count = env_parse("CARDSYNC_WORKERS")?
            .or(file.worker_count)
            .unwrap_or(defaults.worker_count);
        if worker_count == 0 {
            return Err(SyncError::Config("worker_count must be at least 1".into()));
        }

        Ok(Self {
            base_url: std::env::var("CARDSYNC_BASE_URL")
                .ok()
                .or(file.base_url)
                .unwrap_or(defaults.base_url),
            database_path: std::env::var("CARDSYNC_DATABASE_PATH")
                .ok()
                .map(PathBuf::from)
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            request_timeout_secs: env_parse("CARDSYNC_TIMEOUT_SECS")?
                .or(file.request_timeout_secs)
                .unwrap_or(defaults.request_timeout_secs),
            worker_count,
        })
    }

    /// Remote call timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| SyncError::Config(format!("{name}: invalid value {raw:?}"))),
        Err(_) => Ok(None),
    }
}

fn load_config_file() -> Result<Option<FileConfig>> {
    let Some(path) = dirs::config_dir().map(|d| d.join("cardsync").join("config.toml")) else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| SyncError::Config(format!("read {path:?}: {e}")))?;
    let parsed = toml::from_str(&contents)
        .map_err(|e| SyncError::Config(format!("parse {path:?}: {e}")))?;
    Ok(Some(parsed))
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cardsync"))
        .unwrap_or_else(|| PathBuf::from("./cardsync_data"))
        .join("cards.db")
}
