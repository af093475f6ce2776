use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use super::FileStatus;

/// One tracked file version, keyed in the index by `file_hash`.
///
/// `create_time`, `entry_age` and `file_status` are overwritten when the entry
/// is added to a [`HashIndex`](crate::HashIndex); whatever the caller put there
/// beforehand is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub file_name: String,
    pub file_hash: String,
    pub file_bytes: u64,
    pub file_version: u32,
    pub file_uuid: Uuid,
    pub create_time: DateTime<Utc>,
    pub entry_age: DateTime<Utc>,
    pub last_access_time: Option<DateTime<Utc>>,
    pub file_status: FileStatus,
}

impl Entry {
    /// A fresh, not yet hashed entry for `file_name` with a new identity.
    pub fn new(file_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            file_name: file_name.into(),
            file_hash: String::new(),
            file_bytes: 0,
            file_version: 1,
            file_uuid: Uuid::new_v4(),
            create_time: now,
            entry_age: now,
            last_access_time: None,
            file_status: FileStatus::Active,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.file_version = version;
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.file_hash = hash.into();
        self
    }
}
