//! The paste store: durable create/lookup over the index and blob store
//!
//! Exactly one code path mutates the index: `PasteStore::create`. The
//! writer mutex serializes allocate-append-publish, so concurrent commits
//! are never lost. Readers resolve an id through the published offset map
//! and then read the append-only file without any lock; offsets are stable
//! once published, and publication happens only after fsync, so a reader
//! sees either the whole committed record or nothing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use crate::blob::{BlobStore, LocalBackend};
use crate::index::{IndexReader, IndexWriter, PasteRecord};

use super::alloc::IdAllocator;
use super::errors::{StoreError, StoreResult};

/// An uploaded attachment as received from the boundary.
#[derive(Debug, Clone)]
pub struct Upload {
    pub data: Vec<u8>,
    pub original_name: String,
    pub mime_type: String,
}

/// Durable paste store.
///
/// Owns the id -> record mapping exclusively; the blob store owns the
/// uploaded bytes exclusively.
pub struct PasteStore {
    index_path: PathBuf,
    writer: Mutex<IndexWriter>,
    offsets: RwLock<HashMap<String, u64>>,
    allocator: IdAllocator,
    blobs: BlobStore<LocalBackend>,
    /// Set once a fatal index error has been observed; no further writes
    /// are accepted until an operator repairs or reinitializes the index.
    wedged: AtomicBool,
}

impl PasteStore {
    /// Open the store rooted at `data_dir`.
    ///
    /// Scans the full index to rebuild the offset map; any corruption is
    /// fatal and the store refuses to open.
    pub fn open(data_dir: &Path, max_blob_size: u64) -> StoreResult<Self> {
        let writer = IndexWriter::open(data_dir)?;
        let offsets = writer.offsets().clone();
        let index_path = writer.path().to_path_buf();

        let backend = LocalBackend::new(data_dir.join("uploads"));

        Ok(Self {
            index_path,
            writer: Mutex::new(writer),
            offsets: RwLock::new(offsets),
            allocator: IdAllocator::new(),
            blobs: BlobStore::new(backend, max_blob_size),
            wedged: AtomicBool::new(false),
        })
    }

    /// Create a paste from optional text and an optional upload.
    ///
    /// Order of effects: blob first, then id allocation and index commit
    /// under the writer lock. A blob failure aborts before any record
    /// exists; an index failure leaves the blob orphaned but never
    /// referenced.
    ///
    /// Returns the newly assigned id. The record is durable (fsynced) and
    /// visible to readers before this returns.
    pub fn create(&self, text: Option<String>, upload: Option<Upload>) -> StoreResult<String> {
        if self.wedged.load(Ordering::Acquire) {
            return Err(StoreError::IndexCorrupt(
                "Writes disabled after an earlier fatal index error".to_string(),
            ));
        }

        // An empty string counts as absent, matching the boundary contract
        let text = text.filter(|t| !t.is_empty());

        if text.is_none() && upload.is_none() {
            return Err(StoreError::EmptyContent);
        }

        let blob = match upload {
            Some(u) => Some(self.blobs.put(&u.data, &u.original_name, &u.mime_type)?),
            None => None,
        };

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::StorageUnavailable("Index writer lock poisoned".into()))?;

        let id = self.allocator.allocate(|candidate| writer.contains(candidate))?;

        let record = PasteRecord::new(id.clone(), text, blob);
        let offset = writer.append(&record).map_err(|e| self.escalate(e.into()))?;

        // Publish only after the fsynced append: a concurrent get sees the
        // whole committed record or nothing
        self.offsets
            .write()
            .map_err(|_| StoreError::StorageUnavailable("Offset map lock poisoned".into()))?
            .insert(id.clone(), offset);

        Ok(id)
    }

    /// Look up a paste by id.
    ///
    /// Pure read: resolves the offset under a shared lock held only for
    /// the map lookup, then reads the record from disk with the checksum
    /// verified.
    pub fn get(&self, id: &str) -> StoreResult<PasteRecord> {
        let offset = {
            let offsets = self
                .offsets
                .read()
                .map_err(|_| StoreError::StorageUnavailable("Offset map lock poisoned".into()))?;
            match offsets.get(id) {
                Some(offset) => *offset,
                None => return Err(StoreError::NotFound(id.to_string())),
            }
        };

        let mut reader = IndexReader::open(&self.index_path).map_err(|e| self.escalate(e.into()))?;
        let record = reader
            .read_at(offset)
            .map_err(|e| self.escalate(e.into()))?;

        if record.id != id {
            return Err(self.escalate(StoreError::IndexCorrupt(format!(
                "Offset map points at record '{}' for id '{}'",
                record.id, id
            ))));
        }

        Ok(record)
    }

    /// Read blob bytes by storage key.
    pub fn read_blob(&self, storage_key: &str) -> StoreResult<Vec<u8>> {
        Ok(self.blobs.open(storage_key)?)
    }

    /// Number of committed records.
    pub fn record_count(&self) -> usize {
        self.offsets.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Wedge the store on fatal errors so no further writes are accepted.
    fn escalate(&self, e: StoreError) -> StoreError {
        if matches!(e, StoreError::IndexCorrupt(_)) {
            self.wedged.store(true, Ordering::Release);
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> PasteStore {
        PasteStore::open(temp.path(), 10 * 1024 * 1024).unwrap()
    }

    fn sample_upload() -> Upload {
        Upload {
            data: vec![0xDE, 0xAD, 0xBE, 0xEF],
            original_name: "dump.bin".to_string(),
            mime_type: "application/octet-stream".to_string(),
        }
    }

    #[test]
    fn test_text_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create(Some("hello".to_string()), None).unwrap();
        let record = store.get(&id).unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.text.as_deref(), Some("hello"));
        assert!(record.blob.is_none());
    }

    #[test]
    fn test_attachment_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create(None, Some(sample_upload())).unwrap();
        let record = store.get(&id).unwrap();

        let blob = record.blob.expect("record should carry a blob ref");
        assert_eq!(blob.original_name, "dump.bin");
        assert_eq!(blob.mime_type, "application/octet-stream");
        assert_eq!(blob.size_bytes, 4);

        let bytes = store.read_blob(&blob.storage_key).unwrap();
        assert_eq!(bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_text_and_attachment_both_stored() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store
            .create(Some("caption".to_string()), Some(sample_upload()))
            .unwrap();
        let record = store.get(&id).unwrap();

        assert_eq!(record.text.as_deref(), Some("caption"));
        assert!(record.blob.is_some());
    }

    #[test]
    fn test_empty_content_rejected() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let result = store.create(None, None);
        assert!(matches!(result, Err(StoreError::EmptyContent)));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_empty_string_counts_as_absent() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let result = store.create(Some(String::new()), None);
        assert!(matches!(result, Err(StoreError::EmptyContent)));
    }

    #[test]
    fn test_unknown_id() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let result = store.get("nonexistent");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();

        let id = {
            let store = open_store(&temp);
            store.create(Some("durable".to_string()), None).unwrap()
        };

        let store = open_store(&temp);
        let record = store.get(&id).unwrap();
        assert_eq!(record.text.as_deref(), Some("durable"));
    }

    #[test]
    fn test_blob_failure_commits_no_record() {
        let temp = TempDir::new().unwrap();
        let store = PasteStore::open(temp.path(), 2).unwrap();

        let result = store.create(None, Some(sample_upload()));
        assert!(matches!(result, Err(StoreError::StorageUnavailable(_))));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_corruption_wedges_writes() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create(Some("about to rot".to_string()), None).unwrap();

        // Corrupt the committed record behind the store's back
        let index_path = temp.path().join("index").join("pastes.idx");
        let mut contents = std::fs::read(&index_path).unwrap();
        let mid = contents.len() / 2;
        contents[mid] ^= 0xFF;
        std::fs::write(&index_path, contents).unwrap();

        let read = store.get(&id);
        assert!(matches!(read, Err(StoreError::IndexCorrupt(_))));

        // The store now refuses writes without touching disk
        let write = store.create(Some("refused".to_string()), None);
        assert!(matches!(write, Err(StoreError::IndexCorrupt(_))));
    }
}
