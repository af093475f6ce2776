use filehash::config::{DEFAULT_FILES_PATH, DEFAULT_JOURNAL_CAPACITY, DEFAULT_STALE_AFTER_SECS};
use filehash::IndexConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

/// Gateway settings, read from Rocket's figment (`Rocket.toml`, `ROCKET_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub files_path: PathBuf,
    pub stale_after_secs: u64,
    pub journal_capacity: usize,
    pub refresh_interval_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            files_path: PathBuf::from(DEFAULT_FILES_PATH),
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl GatewayConfig {
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            files_path: self.files_path.clone(),
            stale_after_secs: self.stale_after_secs,
            journal_capacity: self.journal_capacity,
        }
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
