//! Index reader with strict corruption detection
//!
//! Every read validates the record checksum. Any corruption is fatal:
//! a failed read aborts the operation, and a failed scan during boot
//! aborts startup. The index is never "repaired" by skipping records.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::errors::{IndexError, IndexResult};
use super::record::{PasteRecord, MIN_RECORD_SIZE};

/// Index reader for sequential scans and point lookups by offset.
///
/// The index file is append-only, so an offset handed out by the writer
/// stays valid for the lifetime of the store.
pub struct IndexReader {
    index_path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl IndexReader {
    /// Opens the index file for reading.
    pub fn open(index_path: &Path) -> IndexResult<Self> {
        let file = File::open(index_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IndexError::corruption(format!(
                    "Index file not found: {}",
                    index_path.display()
                ))
            } else {
                IndexError::read_failed(
                    format!("Failed to open index file: {}", index_path.display()),
                    e,
                )
            }
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| IndexError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            index_path: index_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Opens the index from a data directory.
    pub fn open_from_data_dir(data_dir: &Path) -> IndexResult<Self> {
        Self::open(&index_file_path(data_dir))
    }

    /// Returns the index file path.
    pub fn path(&self) -> &Path {
        &self.index_path
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns whether there are more records to read.
    pub fn has_more(&self) -> bool {
        self.current_offset < self.file_size
    }

    /// Reads the next record from the index.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at end of file
    /// - `Err(PASTE_INDEX_CORRUPTION)` if the record is malformed (FATAL)
    pub fn read_next(&mut self) -> IndexResult<Option<PasteRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;

        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(IndexError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated index: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            IndexError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 {
            return Err(IndexError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if record_length > remaining {
            return Err(IndexError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);

        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            IndexError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        // Parse and validate (includes checksum verification)
        let (record, bytes_consumed) = PasteRecord::deserialize(&record_buf)
            .map_err(|e| IndexError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += bytes_consumed as u64;

        Ok(Some(record))
    }

    /// Reads all records from the index.
    ///
    /// Any corruption causes immediate failure.
    pub fn read_all(&mut self) -> IndexResult<Vec<PasteRecord>> {
        let mut records = Vec::new();

        while let Some(record) = self.read_next()? {
            records.push(record);
        }

        Ok(records)
    }

    /// Seeks to a specific offset in the file.
    pub fn seek_to(&mut self, offset: u64) -> IndexResult<()> {
        self.reader.seek(SeekFrom::Start(offset)).map_err(|e| {
            IndexError::read_failed(format!("Failed to seek to offset {}", offset), e)
        })?;
        self.current_offset = offset;
        Ok(())
    }

    /// Reads a single record at the specified offset.
    ///
    /// Validates the checksum. Returns `PASTE_INDEX_CORRUPTION` if invalid.
    pub fn read_at(&mut self, offset: u64) -> IndexResult<PasteRecord> {
        self.seek_to(offset)?;
        match self.read_next()? {
            Some(record) => Ok(record),
            None => Err(IndexError::corruption_at_offset(
                offset,
                "No record at specified offset",
            )),
        }
    }

    /// Resets the reader to the beginning of the file.
    pub fn reset(&mut self) -> IndexResult<()> {
        self.seek_to(0)
    }
}

/// Path of the index file inside a data directory.
pub(crate) fn index_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("index").join("pastes.idx")
}
