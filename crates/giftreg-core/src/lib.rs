//! Giftreg Core Library
//!
//! This crate provides the gift register domain models, error types, configuration,
//! and record validation shared by all giftreg components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{InvalidRecordPolicy, OutputFormat, ReportConfig, SourceKind};
pub use error::{ErrorMetadata, LogLevel, RecordField, ReportError, ReportResult};
pub use models::{GiftRecord, GiftReport, GroupCount, GroupKey, TieBreak};
pub use validation::{partition_valid, validate_record};
