//! # Blob Store
//!
//! Persists uploaded bytes under freshly generated storage keys and hands
//! back the `BlobRef` the record index commits.

use std::path::Path;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::backend::StorageBackend;
use super::errors::{StorageError, StorageResult};

/// Attempts at generating an unused storage key before giving up.
const MAX_KEY_ATTEMPTS: u32 = 5;

/// Random suffix length in bytes (hex-encoded in the key).
const KEY_SUFFIX_BYTES: usize = 4;

/// Reference to a stored blob.
///
/// The record index holds this reference, never the bytes. The storage key
/// is generated here at store time and is independent of any paste id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// Key of the stored object in the uploads area
    pub storage_key: String,
    /// Client-supplied file name at upload time
    pub original_name: String,
    /// Client-supplied content type at upload time
    pub mime_type: String,
    /// Stored object size in bytes
    pub size_bytes: u64,
}

/// Blob store over a pluggable backend.
///
/// `put` is the only write operation; stored objects are never mutated or
/// deleted.
#[derive(Debug)]
pub struct BlobStore<B: StorageBackend> {
    backend: B,
    max_blob_size: u64,
}

impl<B: StorageBackend> BlobStore<B> {
    /// Create a new blob store with the given size limit.
    pub fn new(backend: B, max_blob_size: u64) -> Self {
        Self {
            backend,
            max_blob_size,
        }
    }

    /// Store uploaded bytes under a fresh key.
    ///
    /// The key preserves the extension of the original file name so clients
    /// can infer a content type from the blob URL. The backend refuses to
    /// overwrite, so a key collision yields a new key rather than data loss.
    ///
    /// # Errors
    ///
    /// `FileTooLarge` if the payload exceeds the configured limit, or the
    /// backend's error if persistence fails. On any error nothing is
    /// committed.
    pub fn put(&self, data: &[u8], original_name: &str, mime_type: &str) -> StorageResult<BlobRef> {
        if data.len() as u64 > self.max_blob_size {
            return Err(StorageError::FileTooLarge(
                data.len() as u64,
                self.max_blob_size,
            ));
        }

        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = generate_key(original_name);
            match self.backend.write(&key, data) {
                Ok(()) => {
                    return Ok(BlobRef {
                        storage_key: key,
                        original_name: original_name.to_string(),
                        mime_type: mime_type.to_string(),
                        size_bytes: data.len() as u64,
                    })
                }
                Err(StorageError::ObjectAlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(StorageError::IoError(format!(
            "Storage key collisions persisted after {} attempts",
            MAX_KEY_ATTEMPTS
        )))
    }

    /// Read the object stored under the key.
    pub fn open(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.backend.read(storage_key)
    }

    /// Check whether an object exists under the key.
    pub fn contains(&self, storage_key: &str) -> StorageResult<bool> {
        self.backend.exists(storage_key)
    }
}

/// Generate a storage key: `<unix-millis>-<random hex><original extension>`.
fn generate_key(original_name: &str) -> String {
    let mut suffix = [0u8; KEY_SUFFIX_BYTES];
    OsRng.fill_bytes(&mut suffix);

    let hex: String = suffix.iter().map(|b| format!("{:02x}", b)).collect();

    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        hex,
        sanitized_extension(original_name)
    )
}

/// Extension of the original name, dot included, or empty.
///
/// Only short alphanumeric extensions are kept; anything else would risk
/// producing a key the backend rejects.
fn sanitized_extension(original_name: &str) -> String {
    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext)
            if !ext.is_empty()
                && ext.len() <= 16
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext)
        }
        _ => String::new(),
    }
}
