use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_FILES_PATH: &str = "./uploads";
pub const DEFAULT_STALE_AFTER_SECS: u64 = 30 * 60;
pub const DEFAULT_JOURNAL_CAPACITY: usize = 4096;

/// Settings for a [`HashIndex`](crate::HashIndex).
///
/// Missing keys fall back to their defaults, so the struct can be extracted
/// from a partially filled config source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory every `file_name` is resolved against.
    pub files_path: PathBuf,
    /// Age at which an entry is marked STALE by a refresh sweep.
    pub stale_after_secs: u64,
    /// Lines kept by the diagnostic journal before the oldest are dropped.
    pub journal_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            files_path: PathBuf::from(DEFAULT_FILES_PATH),
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

impl IndexConfig {
    pub fn new(files_path: impl Into<PathBuf>) -> Self {
        Self {
            files_path: files_path.into(),
            ..Self::default()
        }
    }

    pub fn stale_after(&self) -> chrono::Duration {
        i64::try_from(self.stale_after_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}
