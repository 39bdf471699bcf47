//! # Local Filesystem Backend

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use super::backend::StorageBackend;
use super::errors::{StorageError, StorageResult};

/// Local filesystem storage backend rooted at the uploads directory.
///
/// Keys map to single files directly under the root; path traversal is
/// rejected before any filesystem access.
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn full_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl StorageBackend for LocalBackend {
    fn write(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let full_path = self.full_path(key)?;

        fs::create_dir_all(&self.root).map_err(|e| StorageError::IoError(e.to_string()))?;

        // create_new: an existing object is never overwritten
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::ObjectAlreadyExists(key.to_string())
                } else {
                    StorageError::IoError(e.to_string())
                }
            })?;

        file.write_all(data)
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        // fsync: the enclosing creation must not be acknowledged over
        // blob bytes still sitting in the page cache
        file.sync_all()
            .map_err(|e| StorageError::IoError(e.to_string()))
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(key)?;

        fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::ObjectNotFound(key.to_string())
            } else {
                StorageError::IoError(e.to_string())
            }
        })
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.full_path(key)?.exists())
    }
}
