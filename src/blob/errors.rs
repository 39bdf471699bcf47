//! # Blob Storage Errors

use thiserror::Error;

/// Result type for blob storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object already exists: {0}")]
    ObjectAlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("File too large: {0} bytes (max: {1})")]
    FileTooLarge(u64, u64),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl StorageError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::ObjectNotFound(_) => 404,
            StorageError::ObjectAlreadyExists(_) => 409,
            StorageError::InvalidKey(_) => 400,
            StorageError::FileTooLarge(_, _) => 413,
            StorageError::IoError(_) => 500,
        }
    }
}
