//! Record index subsystem for pastebox
//!
//! The index holds the canonical persistent state of all paste records.
//! It is an append-only record file with no in-place updates: a paste is
//! written exactly once at creation time and never mutated afterwards.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates, no deletes)
//! - Checksum-verified on every read
//! - fsync before a creation is acknowledged
//! - Halt-on-corruption: a malformed record is fatal, never skipped

mod checksum;
mod errors;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{IndexError, IndexResult, Severity};
pub use reader::IndexReader;
pub use record::PasteRecord;
pub use writer::IndexWriter;
