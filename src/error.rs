use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),
    #[error("Size mismatch. Expected: {expected}, Got: {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("Digest mismatch. Expected: {expected}, Got: {actual}")]
    DigestMismatch { expected: String, actual: String },
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
