pub mod journal;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::digest::DigestEngine;
use crate::{Entry, FileStatus, IndexConfig};
use journal::Journal;

/// Outcome of a refresh sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub active: usize,
    pub stale: usize,
}

/// In-memory map from content digest to [`Entry`].
///
/// Every access to the map goes through one lock, and the map is never handed
/// out. Clones share the same map and journal. Hashing reads from disk and
/// never takes the lock.
#[derive(Debug, Clone)]
pub struct HashIndex {
    files: Arc<Mutex<HashMap<String, Entry>>>,
    digest: DigestEngine,
    journal: Journal,
    stale_after: chrono::Duration,
}

impl HashIndex {
    pub fn new(files_path: impl Into<PathBuf>) -> Self {
        Self::with_config(IndexConfig::new(files_path))
    }

    pub fn with_config(config: IndexConfig) -> Self {
        let journal = Journal::new(config.journal_capacity);
        let digest = DigestEngine::new(config.files_path.clone(), journal.clone());
        info!(files_path = %config.files_path.display(), stale_after_secs = config.stale_after_secs, "hash index initialised");

        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            digest,
            journal,
            stale_after: config.stale_after(),
        }
    }

    /// Insert `entry` under its `file_hash`, replacing any entry already there.
    ///
    /// `create_time` and `entry_age` are stamped with the current time and the
    /// status reset to ACTIVE.
    pub async fn add(&self, mut entry: Entry) {
        let mut files = self.files.lock().await;

        let now = Utc::now();
        entry.create_time = now;
        entry.entry_age = now;
        entry.file_status = FileStatus::Active;
        debug!(file_hash = %entry.file_hash, file_name = %entry.file_name, "add");
        files.insert(entry.file_hash.clone(), entry);
    }

    pub async fn remove(&self, hash: &str) -> Option<Entry> {
        let mut files = self.files.lock().await;
        let removed = files.remove(hash);
        if removed.is_some() {
            debug!(file_hash = %hash, "remove");
        }
        removed
    }

    pub async fn refresh(&self) -> RefreshSummary {
        self.refresh_at(Utc::now()).await
    }

    /// Recompute every entry's status against `now`: younger than the
    /// threshold is ACTIVE, anything at or past it is STALE.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> RefreshSummary {
        let mut files = self.files.lock().await;
        let mut summary = RefreshSummary::default();

        for (key, entry) in files.iter_mut() {
            entry.file_status = if now - entry.entry_age < self.stale_after {
                summary.active += 1;
                FileStatus::Active
            } else {
                summary.stale += 1;
                FileStatus::Stale
            };

            let entry_age = entry.entry_age.to_rfc3339_opts(SecondsFormat::Secs, true);
            debug!(file_hash = %key, %entry_age, status = %entry.file_status, "refresh");
            self.journal
                .record(
                    "refresh()",
                    format!("key={} entry_age={} marked {}", key, entry_age, entry.file_status),
                )
                .await;
        }

        summary
    }

    /// Hash the stored file behind `entry.file_name`. See [`DigestEngine::digest`].
    pub async fn hash(&self, entry: Entry) -> Entry {
        self.digest.digest(entry).await
    }

    pub async fn get(&self, hash: &str) -> Option<Entry> {
        let files = self.files.lock().await;
        files.get(hash).cloned()
    }

    pub async fn contains(&self, hash: &str) -> bool {
        self.files.lock().await.contains_key(hash)
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }

    /// Snapshot of every entry, ordered by file name then version.
    pub async fn entries(&self) -> Vec<Entry> {
        let files = self.files.lock().await;
        let mut entries: Vec<Entry> = files.values().cloned().collect();
        entries.sort_by(|a, b| {
            a.file_name
                .cmp(&b.file_name)
                .then(a.file_version.cmp(&b.file_version))
                .then(a.file_hash.cmp(&b.file_hash))
        });
        entries
    }

    pub async fn find_by_name(&self, file_name: &str) -> Vec<Entry> {
        let files = self.files.lock().await;
        let mut entries: Vec<Entry> = files
            .values()
            .filter(|entry| entry.file_name == file_name)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.file_version);
        entries
    }

    pub async fn latest_version(&self, file_name: &str) -> Option<u32> {
        let files = self.files.lock().await;
        files
            .values()
            .filter(|entry| entry.file_name == file_name)
            .map(|entry| entry.file_version)
            .max()
    }

    /// Drop every entry for `file_name` except the one keyed by `keep_hash`,
    /// returning what was dropped ordered by version.
    pub async fn supersede(&self, file_name: &str, keep_hash: &str) -> Vec<Entry> {
        let mut files = self.files.lock().await;
        let stale_keys: Vec<String> = files
            .iter()
            .filter(|(key, entry)| entry.file_name == file_name && key.as_str() != keep_hash)
            .map(|(key, _)| key.clone())
            .collect();

        let mut dropped: Vec<Entry> = stale_keys.iter().filter_map(|key| files.remove(key)).collect();
        dropped.sort_by_key(|entry| entry.file_version);
        if !dropped.is_empty() {
            debug!(%file_name, keep_hash, dropped = dropped.len(), "supersede");
        }
        dropped
    }

    /// Move an entry's staleness reference point. The status itself only
    /// changes on the next refresh. Returns `false` if `hash` is not indexed.
    pub async fn reset_age(&self, hash: &str, age: DateTime<Utc>) -> bool {
        let mut files = self.files.lock().await;
        match files.get_mut(hash) {
            Some(entry) => {
                entry.entry_age = age;
                true
            }
            None => false,
        }
    }

    /// Record a read of `hash` and return the updated entry.
    pub async fn touch(&self, hash: &str) -> Option<Entry> {
        let mut files = self.files.lock().await;
        let entry = files.get_mut(hash)?;
        entry.last_access_time = Some(Utc::now());
        Some(entry.clone())
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn digest_engine(&self) -> &DigestEngine {
        &self.digest
    }

    pub fn stale_after(&self) -> chrono::Duration {
        self.stale_after
    }
}
