//! Index writer with fsync enforcement
//!
//! The writer is append-only: one record per successful creation, written
//! and fsynced before the creation is acknowledged. Ids are never reused
//! and records are never rewritten, so the id -> offset map only grows.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{IndexError, IndexResult};
use super::reader::{index_file_path, IndexReader};
use super::record::PasteRecord;

/// Append-only writer for the paste index file.
///
/// Maintains the in-memory id -> offset map, rebuilt on open by a full
/// checksum-verified scan.
#[derive(Debug)]
pub struct IndexWriter {
    index_path: PathBuf,
    file: File,
    current_offset: u64,
    paste_offsets: HashMap<String, u64>,
}

impl IndexWriter {
    /// Opens or creates the index file at `<data_dir>/index/pastes.idx`.
    ///
    /// Creates parent directories if needed and scans any existing records
    /// to rebuild the offset map.
    ///
    /// # Errors
    ///
    /// Returns `PASTE_INDEX_WRITE_FAILED` if the file cannot be created or
    /// opened, and `PASTE_INDEX_CORRUPTION` (FATAL) if the existing index
    /// fails its scan.
    pub fn open(data_dir: &Path) -> IndexResult<Self> {
        let index_dir = data_dir.join("index");
        let index_path = index_file_path(data_dir);

        if !index_dir.exists() {
            fs::create_dir_all(&index_dir).map_err(|e| {
                IndexError::write_failed(
                    format!("Failed to create index directory: {}", index_dir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&index_path)
            .map_err(|e| {
                IndexError::write_failed(
                    format!("Failed to open index file: {}", index_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| IndexError::write_failed("Failed to read file metadata", e))?
            .len();

        let paste_offsets = Self::build_offset_map(&index_path)?;

        Ok(Self {
            index_path,
            file,
            current_offset,
            paste_offsets,
        })
    }

    /// Builds the in-memory offset map by scanning the index file.
    fn build_offset_map(index_path: &Path) -> IndexResult<HashMap<String, u64>> {
        let mut offsets = HashMap::new();

        let metadata = match fs::metadata(index_path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(offsets),
            Err(e) => return Err(IndexError::read_failed("Failed to read index metadata", e)),
        };

        if metadata.len() == 0 {
            return Ok(offsets);
        }

        let mut reader = IndexReader::open(index_path)?;
        loop {
            let offset = reader.current_offset();
            match reader.read_next() {
                Ok(Some(record)) => {
                    offsets.insert(record.id, offset);
                }
                Ok(None) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(offsets)
    }

    /// Returns the path to the index file.
    pub fn path(&self) -> &Path {
        &self.index_path
    }

    /// Returns the current file offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns the number of committed records.
    pub fn record_count(&self) -> usize {
        self.paste_offsets.len()
    }

    /// Returns whether a record exists under the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.paste_offsets.contains_key(id)
    }

    /// Returns the offset for a committed record, if it exists.
    pub fn offset_of(&self, id: &str) -> Option<u64> {
        self.paste_offsets.get(id).copied()
    }

    /// Returns a snapshot of the id -> offset map.
    pub fn offsets(&self) -> &HashMap<String, u64> {
        &self.paste_offsets
    }

    /// Appends a record to the index with fsync enforcement.
    ///
    /// # Returns
    ///
    /// The byte offset where the record was written.
    ///
    /// # Errors
    ///
    /// Returns `PASTE_INDEX_WRITE_FAILED` if the write or the fsync fails;
    /// in that case the record is not acknowledged and the offset map is
    /// left untouched.
    pub fn append(&mut self, record: &PasteRecord) -> IndexResult<u64> {
        if self.paste_offsets.contains_key(&record.id) {
            return Err(IndexError::corruption_for_paste(
                &record.id,
                "Duplicate paste id in append-only index",
            ));
        }

        let serialized = record.serialize();
        let offset = self.current_offset;

        self.file.write_all(&serialized).map_err(|e| {
            IndexError::write_failed(format!("Failed to write record: {}", record.id), e)
        })?;

        // fsync - mandatory for durability
        self.file.sync_all().map_err(|e| {
            IndexError::write_failed(
                format!("fsync failed after writing record: {}", record.id),
                e,
            )
        })?;

        self.current_offset += serialized.len() as u64;
        self.paste_offsets.insert(record.id.clone(), offset);

        Ok(offset)
    }
}
