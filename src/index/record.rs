//! Paste record types and on-disk encoding
//!
//! The index record format is:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Paste ID         | (length-prefixed string)
//! +------------------+
//! | Created At       | (i64 LE, unix milliseconds UTC)
//! +------------------+
//! | Flags            | (u8: bit0 = has text, bit1 = has blob)
//! +------------------+
//! | Text             | (length-prefixed bytes)
//! +------------------+
//! | Storage Key      | (length-prefixed string)
//! +------------------+
//! | Original Name    | (length-prefixed string)
//! +------------------+
//! | Mime Type        | (length-prefixed string)
//! +------------------+
//! | Size Bytes       | (u64 LE)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself. Absent fields are
//! encoded empty; the flags byte is authoritative for presence.

use std::io::{self, Read};

use chrono::{DateTime, TimeZone, Utc};

use crate::blob::BlobRef;

const FLAG_TEXT: u8 = 0b01;
const FLAG_BLOB: u8 = 0b10;

/// Minimum size of a serialized record in bytes.
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 8 + 1 + 4 + 4 + 4 + 4 + 8 + 4;

/// Complete paste record as stored in the index.
///
/// A record carries at least one of `text` / `blob` and is immutable once
/// committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRecord {
    /// Unique identifier, assigned once at creation
    pub id: String,
    /// Optional UTF-8 payload
    pub text: Option<String>,
    /// Optional reference to a stored blob
    pub blob: Option<BlobRef>,
    /// Creation time, set once at commit
    pub created_at: DateTime<Utc>,
}

impl PasteRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<String>, text: Option<String>, blob: Option<BlobRef>) -> Self {
        Self {
            id: id.into(),
            text,
            blob,
            created_at: Utc::now(),
        }
    }

    /// Returns whether the record carries any content at all.
    pub fn has_content(&self) -> bool {
        self.text.is_some() || self.blob.is_some()
    }

    /// Serialize the record body (everything except length prefix and
    /// checksum). This is part of the data the checksum covers.
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.extend_from_slice(&(self.id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.id.as_bytes());

        buf.extend_from_slice(&self.created_at.timestamp_millis().to_le_bytes());

        let mut flags = 0u8;
        if self.text.is_some() {
            flags |= FLAG_TEXT;
        }
        if self.blob.is_some() {
            flags |= FLAG_BLOB;
        }
        buf.push(flags);

        let text = self.text.as_deref().unwrap_or("");
        buf.extend_from_slice(&(text.len() as u32).to_le_bytes());
        buf.extend_from_slice(text.as_bytes());

        let (key, name, mime, size) = match &self.blob {
            Some(blob) => (
                blob.storage_key.as_str(),
                blob.original_name.as_str(),
                blob.mime_type.as_str(),
                blob.size_bytes,
            ),
            None => ("", "", "", 0),
        };

        for field in [key, name, mime] {
            buf.extend_from_slice(&(field.len() as u32).to_le_bytes());
            buf.extend_from_slice(field.as_bytes());
        }
        buf.extend_from_slice(&size.to_le_bytes());

        buf
    }

    /// Serialize the complete record to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();

        // Record length = 4 (length) + body.len() + 4 (checksum)
        let record_length = (4 + body.len() + 4) as u32;

        // Checksum covers: length + body
        let mut checksum_data = Vec::with_capacity(4 + body.len());
        checksum_data.extend_from_slice(&record_length.to_le_bytes());
        checksum_data.extend_from_slice(&body);
        let checksum = super::checksum::compute_checksum(&checksum_data);

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying the checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        // Extract and verify checksum
        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);

        let checksum_data = &data[0..checksum_offset];
        let computed_checksum = super::checksum::compute_checksum(checksum_data);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        let id = read_string(&mut cursor)?;

        let mut millis_buf = [0u8; 8];
        cursor.read_exact(&mut millis_buf)?;
        let millis = i64::from_le_bytes(millis_buf);
        let created_at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Invalid timestamp: {}", millis),
                )
            })?;

        let mut flags_buf = [0u8; 1];
        cursor.read_exact(&mut flags_buf)?;
        let flags = flags_buf[0];

        if flags == 0 || flags > (FLAG_TEXT | FLAG_BLOB) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid flags byte: {:#04x}", flags),
            ));
        }

        let text_bytes = read_bytes(&mut cursor)?;
        let storage_key = read_string(&mut cursor)?;
        let original_name = read_string(&mut cursor)?;
        let mime_type = read_string(&mut cursor)?;

        let mut size_buf = [0u8; 8];
        cursor.read_exact(&mut size_buf)?;
        let size_bytes = u64::from_le_bytes(size_buf);

        let text = if flags & FLAG_TEXT != 0 {
            Some(String::from_utf8(text_bytes).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
            })?)
        } else {
            None
        };

        let blob = if flags & FLAG_BLOB != 0 {
            Some(BlobRef {
                storage_key,
                original_name,
                mime_type,
                size_bytes,
            })
        } else {
            None
        };

        Ok((
            Self {
                id,
                text,
                blob,
                created_at,
            },
            record_length,
        ))
    }
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    String::from_utf8(read_bytes(reader)?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}

fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    Ok(buf)
}
