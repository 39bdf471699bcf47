//! Store error taxonomy exposed to callers
//!
//! Lower layers carry their own error types; this is the boundary
//! vocabulary the HTTP shell translates to status codes.

use thiserror::Error;

use crate::blob;
use crate::index::IndexError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No text and no file submitted. User input error, not retried.
    #[error("No content provided")]
    EmptyContent,

    /// Unknown paste id or storage key. Not retried.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier retry budget exceeded. Transient; the caller may retry
    /// the whole creation.
    #[error("Identifier allocation exhausted after {0} attempts")]
    AllocationExhausted(u32),

    /// Blob persistence or index append failed. The creation was aborted
    /// before any record was committed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Backing index unreadable or malformed. Fatal for the store: no
    /// further writes are accepted until an operator repairs or
    /// reinitializes the index.
    #[error("Index corrupt: {0}")]
    IndexCorrupt(String),
}

impl StoreError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::EmptyContent => 400,
            StoreError::NotFound(_) => 404,
            StoreError::AllocationExhausted(_) => 503,
            StoreError::StorageUnavailable(_) => 503,
            StoreError::IndexCorrupt(_) => 500,
        }
    }
}

impl From<IndexError> for StoreError {
    fn from(e: IndexError) -> Self {
        if e.is_fatal() {
            StoreError::IndexCorrupt(e.to_string())
        } else {
            StoreError::StorageUnavailable(e.to_string())
        }
    }
}

impl From<blob::StorageError> for StoreError {
    fn from(e: blob::StorageError) -> Self {
        match e {
            blob::StorageError::ObjectNotFound(key) => StoreError::NotFound(key),
            other => StoreError::StorageUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::EmptyContent.status_code(), 400);
        assert_eq!(StoreError::NotFound("x".into()).status_code(), 404);
        assert_eq!(StoreError::AllocationExhausted(5).status_code(), 503);
        assert_eq!(StoreError::IndexCorrupt("bad".into()).status_code(), 500);
    }

    #[test]
    fn test_fatal_index_error_maps_to_corrupt() {
        let e = IndexError::corruption("checksum mismatch");
        assert!(matches!(StoreError::from(e), StoreError::IndexCorrupt(_)));
    }

    #[test]
    fn test_nonfatal_index_error_maps_to_unavailable() {
        let e = IndexError::write_failed(
            "disk full",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(matches!(
            StoreError::from(e),
            StoreError::StorageUnavailable(_)
        ));
    }

    #[test]
    fn test_blob_not_found_maps_to_not_found() {
        let e = blob::StorageError::ObjectNotFound("key".into());
        assert!(matches!(StoreError::from(e), StoreError::NotFound(_)));
    }
}
