//! Streaming SHA-256 over files in the storage directory.
//!
//! Digests are encoded with URL-safe base64 (padded), so they can be used as
//! path segments without escaping.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::index::journal::Journal;
use crate::storage::validation::validate_file_name;
use crate::{Entry, Result};

/// Digest of zero bytes. A hashed entry carrying this value with
/// `file_bytes == 0` most likely failed to open its file.
pub const EMPTY_DIGEST: &str = "47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU=";

pub const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct DigestEngine {
    base_path: PathBuf,
    journal: Journal,
}

impl DigestEngine {
    pub fn new(base_path: impl Into<PathBuf>, journal: Journal) -> Self {
        Self {
            base_path: base_path.into(),
            journal,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.base_path.join(file_name))
    }

    pub fn digest_bytes(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        URL_SAFE.encode(hasher.finalize())
    }

    /// Hash the stored file named by `entry.file_name`.
    ///
    /// Never fails. Open and read errors are journaled and the entry comes back
    /// with whatever was hashed before the error: [`EMPTY_DIGEST`] and zero
    /// bytes when the file could not be opened at all. Callers should compare
    /// `file_bytes` against the size they expect.
    pub async fn digest(&self, mut entry: Entry) -> Entry {
        let mut file = match self.open(&entry.file_name).await {
            Ok(file) => file,
            Err(err) => {
                warn!(file_name = %entry.file_name, error = %err, "hash: open failed");
                self.journal
                    .record("hash():open", format!("file_name={} {}", entry.file_name, err))
                    .await;
                entry.file_hash = EMPTY_DIGEST.to_string();
                entry.file_bytes = 0;
                return entry;
            }
        };

        let (file_hash, file_bytes, failure) = stream(&mut file).await;
        if let Some(err) = failure {
            warn!(file_name = %entry.file_name, file_bytes, error = %err, "hash: read failed");
            self.journal
                .record("hash():read", format!("file_bytes={} {}", file_bytes, err))
                .await;
        }

        entry.file_hash = file_hash;
        entry.file_bytes = file_bytes;
        entry
    }

    /// Like [`digest`](Self::digest) but reports open and read failures to
    /// the caller instead of degrading.
    pub async fn try_digest(&self, file_name: &str) -> Result<(String, u64)> {
        let mut file = self.open(file_name).await?;
        match stream(&mut file).await {
            (file_hash, file_bytes, None) => Ok((file_hash, file_bytes)),
            (_, _, Some(err)) => Err(err.into()),
        }
    }

    async fn open(&self, file_name: &str) -> Result<File> {
        let path = self.resolve(file_name)?;
        Ok(File::open(path).await?)
    }
}

async fn stream(file: &mut File) -> (String, u64, Option<io::Error>) {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0u64;

    let failure = loop {
        match file.read(&mut buffer).await {
            Ok(0) => break None,
            Ok(n) => {
                hasher.update(&buffer[..n]);
                total += n as u64;
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => break Some(err),
        }
    };

    (URL_SAFE.encode(hasher.finalize()), total, failure)
}
