//! Shared path generation for the note export.
//!
//! Gift notes live at `{year}/{RegistrationNumber}.md`; MEP and donor stubs at
//! `{name}.md`. Both are relative to their configured directory.

use std::path::PathBuf;

use giftreg_core::GiftRecord;

use crate::{StorageError, StorageResult};

/// Replace path separators so a free-text name is a single file name.
pub fn sanitize_file_stem(name: &str) -> String {
    name.trim().replace(['/', '\\'], "-")
}

/// Relative path of a gift note, `{year}/{RegistrationNumber}.md`.
pub fn gift_note_path(record: &GiftRecord) -> StorageResult<PathBuf> {
    let year = record.registration_year().ok_or_else(|| {
        StorageError::InvalidKey(format!(
            "registration number '{}' has no '-YY' year suffix",
            record.registration_number
        ))
    })?;
    let stem = checked_stem(&record.registration_number)?;
    Ok(PathBuf::from(year.to_string()).join(format!("{}.md", stem)))
}

/// Relative path of an MEP or donor stub note, `{name}.md`.
pub fn stub_note_path(name: &str) -> StorageResult<PathBuf> {
    let stem = checked_stem(name)?;
    Ok(PathBuf::from(format!("{}.md", stem)))
}

fn checked_stem(raw: &str) -> StorageResult<String> {
    let stem = sanitize_file_stem(raw);
    if stem.is_empty() {
        return Err(StorageError::InvalidKey("note name is empty".to_string()));
    }
    if stem.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "note name '{}' contains '..'",
            raw
        )));
    }
    Ok(stem)
}
