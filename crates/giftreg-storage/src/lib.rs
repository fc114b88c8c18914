//! Giftreg Storage Library
//!
//! This crate reads gift records from their on-disk forms and writes the
//! per-gift note export. It includes the `RecordSource` trait with
//! implementations for the delimited register export and for a folder of
//! Markdown notes, plus the `NoteWriter`.
//!
//! # Note layout
//!
//! All paths are relative to a configured root and share one layout:
//!
//! - **Gift notes**: `{gifts_dir}/{year}/{RegistrationNumber}.md`, year taken
//!   from the registration number suffix (`G12-23` -> `2023`)
//! - **MEP / donor stubs**: `{dir}/{name}.md` with `/` and `\` replaced by `-`
//!
//! Path generation is centralized in the `keys` module.

#[cfg(feature = "source-csv")]
pub mod csv_export;
pub mod factory;
pub(crate) mod keys;
pub mod notes;
pub mod traits;
#[cfg(feature = "source-vault")]
pub mod vault;

// Re-export commonly used types
#[cfg(feature = "source-csv")]
pub use csv_export::CsvSource;
pub use factory::create_source;
pub use giftreg_core::SourceKind;
pub use notes::{NoteExportSummary, NoteWriter};
pub use traits::{RecordSource, StorageError, StorageResult};
#[cfg(feature = "source-vault")]
pub use vault::VaultSource;
