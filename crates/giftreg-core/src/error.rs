//! Error types module
//!
//! This module provides the core error types used throughout giftreg.
//! Report and validation failures are unified under the `ReportError` enum;
//! loading failures live in the storage crate and are converted at the binary edge.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a skipped malformed record
    Debug,
    /// Warning level - for caller-recoverable issues
    Warn,
    /// Error level - for failures that abort a run
    Error,
}

/// Metadata describing how an error should be surfaced by a caller.
pub trait ErrorMetadata {
    /// Process exit code to use when the error aborts the CLI
    fn exit_code(&self) -> i32;

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the caller can continue by skipping the offending input
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// A gift record field, named the way the register spreadsheet names its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordField {
    RegistrationNumber,
    NameOfMep,
    Capacity,
    NameOfDonor,
    DescriptionOfGift,
    EstimatedValue,
    LinkToPhoto,
    DateOfReception,
    DateOfNotification,
    Location,
    Miscellaneous,
}

impl RecordField {
    /// Register columns in spreadsheet order.
    pub const ALL: [RecordField; 11] = [
        RecordField::RegistrationNumber,
        RecordField::NameOfMep,
        RecordField::Capacity,
        RecordField::NameOfDonor,
        RecordField::DescriptionOfGift,
        RecordField::EstimatedValue,
        RecordField::LinkToPhoto,
        RecordField::DateOfReception,
        RecordField::DateOfNotification,
        RecordField::Location,
        RecordField::Miscellaneous,
    ];

    /// Column header / frontmatter key for this field
    pub fn column_name(&self) -> &'static str {
        match self {
            RecordField::RegistrationNumber => "RegistrationNumber",
            RecordField::NameOfMep => "NameOfMEP",
            RecordField::Capacity => "Capacity",
            RecordField::NameOfDonor => "NameOfDonor",
            RecordField::DescriptionOfGift => "DescriptionOfGift",
            RecordField::EstimatedValue => "EstimatedValue",
            RecordField::LinkToPhoto => "LinkToPhoto",
            RecordField::DateOfReception => "DateOfReception",
            RecordField::DateOfNotification => "DateOfNotification",
            RecordField::Location => "Location",
            RecordField::Miscellaneous => "Miscellaneous",
        }
    }

    /// Look a field up by its column name (case-insensitive).
    pub fn from_column_name(name: &str) -> Option<RecordField> {
        let name = name.trim();
        RecordField::ALL
            .into_iter()
            .find(|field| field.column_name().eq_ignore_ascii_case(name))
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.column_name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Validation error: record {} is missing {field}", registration_label(.registration_number))]
    Validation {
        field: RecordField,
        registration_number: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn registration_label(registration_number: &Option<String>) -> String {
    match registration_number {
        Some(number) => format!("'{}'", number),
        None => "<unregistered>".to_string(),
    }
}

impl ReportError {
    pub fn missing(field: RecordField, registration_number: &str) -> Self {
        let registration_number = registration_number.trim();
        ReportError::Validation {
            field,
            registration_number: (!registration_number.is_empty())
                .then(|| registration_number.to_string()),
        }
    }

    pub fn unknown_group_key(key: &str) -> Self {
        ReportError::Configuration(format!(
            "unknown grouping key '{}' (expected 'mep' or 'donor')",
            key
        ))
    }
}

/// Result type for report and validation operations
pub type ReportResult<T> = Result<T, ReportError>;

impl ErrorMetadata for ReportError {
    fn exit_code(&self) -> i32 {
        match self {
            ReportError::Validation { .. } => 65,
            ReportError::Configuration(_) => 78,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ReportError::Validation { .. } => "VALIDATION_ERROR",
            ReportError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ReportError::Validation { .. })
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ReportError::Validation { .. } => LogLevel::Warn,
            ReportError::Configuration(_) => LogLevel::Error,
        }
    }
}
