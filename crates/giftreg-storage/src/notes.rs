use crate::keys::{gift_note_path, stub_note_path};
use crate::traits::{StorageError, StorageResult};
use giftreg_core::error::RecordField;
use giftreg_core::models::format_register_date;
use giftreg_core::GiftRecord;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the per-gift note export
///
/// Gift notes go to `{gifts_dir}/{year}/{RegistrationNumber}.md`; every
/// distinct MEP and donor gets a stub note the gift notes link to.
#[derive(Clone, Debug)]
pub struct NoteWriter {
    gifts_dir: PathBuf,
    meps_dir: PathBuf,
    donors_dir: PathBuf,
}

/// Counts of notes written by [`NoteWriter::export`]
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct NoteExportSummary {
    pub gift_notes: usize,
    pub mep_notes: usize,
    pub donor_notes: usize,
}

impl NoteWriter {
    /// Create a new NoteWriter
    ///
    /// # Arguments
    /// * `gifts_dir` - Root of the per-year gift note folders (e.g., "gifts")
    /// * `meps_dir` - Folder for MEP stub notes (e.g., "meps")
    /// * `donors_dir` - Folder for donor stub notes (e.g., "donors")
    pub fn new(
        gifts_dir: impl Into<PathBuf>,
        meps_dir: impl Into<PathBuf>,
        donors_dir: impl Into<PathBuf>,
    ) -> Self {
        NoteWriter {
            gifts_dir: gifts_dir.into(),
            meps_dir: meps_dir.into(),
            donors_dir: donors_dir.into(),
        }
    }

    /// Write one gift note and return its path
    pub fn write_gift(&self, record: &GiftRecord) -> StorageResult<PathBuf> {
        let path = self.gifts_dir.join(gift_note_path(record)?);
        write_note(&path, &render_gift_note(record))?;

        tracing::debug!(
            path = %path.display(),
            registration_number = %record.registration_number,
            "Gift note written"
        );

        Ok(path)
    }

    /// Write a stub note titled `name` into `dir` and return its path
    pub fn write_stub(&self, dir: &Path, name: &str) -> StorageResult<PathBuf> {
        let path = dir.join(stub_note_path(name)?);
        write_note(&path, &format!("# {}\n\n", name.trim()))?;

        tracing::debug!(path = %path.display(), name = %name, "Stub note written");

        Ok(path)
    }

    /// Write gift notes for all records plus one stub per distinct MEP and donor.
    pub fn export(&self, records: &[GiftRecord]) -> StorageResult<NoteExportSummary> {
        let start = std::time::Instant::now();
        let mut summary = NoteExportSummary::default();

        for record in records {
            self.write_gift(record)?;
            summary.gift_notes += 1;
        }

        for mep in distinct(records.iter().filter_map(GiftRecord::mep)) {
            self.write_stub(&self.meps_dir, mep)?;
            summary.mep_notes += 1;
        }

        for donor in distinct(records.iter().filter_map(GiftRecord::donor)) {
            self.write_stub(&self.donors_dir, donor)?;
            summary.donor_notes += 1;
        }

        tracing::info!(
            gifts_dir = %self.gifts_dir.display(),
            gift_notes = summary.gift_notes,
            mep_notes = summary.mep_notes,
            donor_notes = summary.donor_notes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Note export finished"
        );

        Ok(summary)
    }
}

/// Values in order of first appearance, duplicates removed.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

fn write_note(path: &Path, content: &str) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(|e| {
        StorageError::WriteFailed(format!("Failed to write note {}: {}", path.display(), e))
    })
}

/// `[[name]]`, with `|` escaped so it is not read back as an alias separator.
fn wikilink(name: &str) -> String {
    format!("[[{}]]", name.replace('|', "\\|"))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render the Markdown note for one gift: frontmatter in register column
/// order, then a heading and the recipient / donor lines.
pub fn render_gift_note(record: &GiftRecord) -> String {
    let mut out = String::from("---\n");

    for field in RecordField::ALL {
        let value: Option<String> = match field {
            RecordField::RegistrationNumber => Some(record.registration_number.clone()),
            RecordField::NameOfMep => record.mep().map(wikilink),
            RecordField::Capacity => record.capacity.clone(),
            RecordField::NameOfDonor => record.donor().map(wikilink),
            RecordField::DescriptionOfGift => Some(record.description_of_gift.clone()),
            RecordField::EstimatedValue => record.estimated_value.clone(),
            RecordField::LinkToPhoto => record.link_to_photo.clone(),
            RecordField::DateOfReception => record.date_of_reception.as_ref().map(format_register_date),
            RecordField::DateOfNotification => {
                record.date_of_notification.as_ref().map(format_register_date)
            }
            RecordField::Location => record.location.clone(),
            RecordField::Miscellaneous => record.miscellaneous.clone(),
        };
        let rendered = value.as_deref().map(quote).unwrap_or_else(|| "null".to_string());
        let _ = writeln!(out, "{}: {}", field.column_name(), rendered);
    }

    let _ = write!(
        out,
        "---\n\n# {}\n\nReceived by: {}\nFrom: {}\n",
        record.description_of_gift,
        record.mep().unwrap_or_default(),
        record.donor().unwrap_or_default()
    );

    out
}
