use crate::digest::EMPTY_DIGEST;
use crate::{Entry, RegistryError, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// File names must be a single, ordinary path component so they cannot
/// escape the storage directory.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(RegistryError::InvalidName(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(RegistryError::InvalidName(name.to_string())),
    }
}

pub struct ValidationManager {
    base_path: PathBuf,
}

impl ValidationManager {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    /// Check a freshly hashed entry against what the caller wrote (its byte
    /// count and digest) and against the file on disk.
    pub async fn validate_entry(&self, entry: &Entry, expected_bytes: u64, expected_hash: &str) -> Result<()> {
        validate_file_name(&entry.file_name)?;

        if entry.file_bytes != expected_bytes {
            return Err(RegistryError::SizeMismatch { expected: expected_bytes, actual: entry.file_bytes });
        }

        let path = self.base_path.join(&entry.file_name);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::NotFound(entry.file_name.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        if metadata.len() != entry.file_bytes {
            return Err(RegistryError::SizeMismatch { expected: metadata.len(), actual: entry.file_bytes });
        }

        // Same length is not enough: another writer may have replaced the file
        // between persist and hash.
        if entry.file_hash != expected_hash {
            return Err(RegistryError::DigestMismatch {
                expected: expected_hash.to_string(),
                actual: entry.file_hash.clone(),
            });
        }

        if entry.file_bytes > 0 && entry.file_hash == EMPTY_DIGEST {
            return Err(RegistryError::Storage(format!("{} was not hashed", entry.file_name)));
        }

        Ok(())
    }
}
