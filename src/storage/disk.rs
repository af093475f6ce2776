use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use async_trait::async_trait;
use tracing::info;

use crate::storage::validation::validate_file_name;
use crate::{RegistryError, Result};

/// Where uploaded bytes end up. The index only ever reads from here.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Write `data` under `name`, replacing any previous file, and return the
    /// number of bytes written.
    async fn persist(&self, name: &str, data: &[u8]) -> Result<u64>;
    async fn remove(&self, name: &str) -> Result<()>;
    async fn exists(&self, name: &str) -> Result<bool>;
}

pub struct DiskStore {
    base_path: PathBuf,
}

impl DiskStore {
    pub async fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_owned();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, name: &str) -> Result<PathBuf> {
        validate_file_name(name)?;
        Ok(self.base_path.join(name))
    }

    /// Names of all regular files in the storage directory, sorted.
    pub async fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl UploadStore for DiskStore {
    async fn persist(&self, name: &str, data: &[u8]) -> Result<u64> {
        let path = self.file_path(name)?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        info!(file_name = %name, bytes = data.len(), "stored upload");
        Ok(data.len() as u64)
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(RegistryError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }
}
