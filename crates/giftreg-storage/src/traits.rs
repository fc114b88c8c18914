//! Record source abstraction trait
//!
//! This module defines the RecordSource trait that all record sources must implement.

use crate::SourceKind;
use giftreg_core::GiftRecord;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid note path: {0}")]
    InvalidKey(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "source-csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Record source trait
///
/// Every on-disk form of the register (spreadsheet export, notes folder)
/// implements this trait, so the report engine and the CLI work with any
/// source without knowing its format.
///
/// Sources normalise while loading: text is flattened to one line and
/// placeholder values become `None`. They do not validate; malformed records
/// are returned as-is for the caller to check.
pub trait RecordSource {
    /// Load every record, in the source's natural order
    fn load(&self) -> StorageResult<Vec<GiftRecord>>;

    /// Get the source kind
    fn kind(&self) -> SourceKind;
}
