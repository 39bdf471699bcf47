//! Index error types
//!
//! Error codes:
//! - PASTE_INDEX_IO_ERROR (ERROR severity)
//! - PASTE_INDEX_WRITE_FAILED (ERROR severity)
//! - PASTE_INDEX_READ_FAILED (ERROR severity)
//! - PASTE_INDEX_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The store must stop serving writes
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Disk I/O failure
    IoError,
    /// Record append failed
    WriteFailed,
    /// Record read failed
    ReadFailed,
    /// Record checksum or structure failure
    Corruption,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::IoError => "PASTE_INDEX_IO_ERROR",
            IndexErrorCode::WriteFailed => "PASTE_INDEX_WRITE_FAILED",
            IndexErrorCode::ReadFailed => "PASTE_INDEX_READ_FAILED",
            IndexErrorCode::Corruption => "PASTE_INDEX_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::IoError => Severity::Error,
            IndexErrorCode::WriteFailed => Severity::Error,
            IndexErrorCode::ReadFailed => Severity::Error,
            IndexErrorCode::Corruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl IndexError {
    /// Create a new index I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::IoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::WriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::ReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new corruption error (FATAL)
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::Corruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::Corruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Create a corruption error with paste id context
    pub fn corruption_for_paste(paste_id: &str, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::Corruption,
            message: reason.into(),
            details: Some(format!("paste_id: {}", paste_id)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal for the store
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
