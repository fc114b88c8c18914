//! Folder of per-gift Markdown notes as a record source.
//!
//! Each gift note carries its record in YAML frontmatter keyed by the register
//! column names. MEP and donor names are stored as `[[wikilinks]]` so the
//! notes link to their stub pages; the links are unwrapped on load.

use crate::traits::{RecordSource, StorageError, StorageResult};
use crate::SourceKind;
use giftreg_core::error::RecordField;
use giftreg_core::models::{clean_text, normalize_optional, parse_register_date};
use giftreg_core::GiftRecord;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// Target may contain `\|` (an escaped pipe); an unescaped `|` starts the alias.
const WIKILINK_PATTERN: &str = r"^\[\[((?:\\\||[^\]|])+)(?:\|[^\]]*)?\]\]$";

/// Recursively loads gift notes below a root directory
#[derive(Clone, Debug)]
pub struct VaultSource {
    root: PathBuf,
    wikilink: Regex,
}

impl VaultSource {
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let wikilink = Regex::new(WIKILINK_PATTERN).map_err(|e| {
            StorageError::ConfigError(format!("Failed to compile wikilink pattern: {}", e))
        })?;
        Ok(VaultSource {
            root: root.into(),
            wikilink,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse one note. Returns `None` for notes that are not gift records.
    pub fn parse_note(&self, content: &str) -> Option<GiftRecord> {
        let fields = frontmatter_fields(content)?;

        let mut values: BTreeMap<RecordField, Option<String>> = BTreeMap::new();
        for (key, value) in &fields {
            if let Some(field) = RecordField::from_column_name(key) {
                values.insert(field, value_to_text(value));
            }
        }

        let registration_number = values
            .get(&RecordField::RegistrationNumber)
            .cloned()
            .flatten()?;

        let mut take = |field: RecordField| values.remove(&field).flatten();
        let name_of_mep = take(RecordField::NameOfMep).map(|v| self.unwrap_wikilink(&v));
        let name_of_donor = take(RecordField::NameOfDonor).map(|v| self.unwrap_wikilink(&v));

        Some(GiftRecord {
            registration_number,
            name_of_mep,
            capacity: take(RecordField::Capacity),
            name_of_donor,
            description_of_gift: take(RecordField::DescriptionOfGift).unwrap_or_default(),
            estimated_value: take(RecordField::EstimatedValue),
            link_to_photo: take(RecordField::LinkToPhoto),
            date_of_reception: take(RecordField::DateOfReception)
                .and_then(|d| parse_register_date(&d)),
            date_of_notification: take(RecordField::DateOfNotification)
                .and_then(|d| parse_register_date(&d)),
            location: take(RecordField::Location),
            miscellaneous: take(RecordField::Miscellaneous),
        })
    }

    /// `[[Name]]` or `[[Name|alias]]` -> `Name`, with `\|` in the name
    /// unescaped; other values are returned trimmed.
    pub fn unwrap_wikilink(&self, value: &str) -> String {
        let value = value.trim();
        self.wikilink
            .captures(value)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().replace("\\|", "|"))
            .unwrap_or_else(|| value.to_string())
    }
}

impl RecordSource for VaultSource {
    fn load(&self) -> StorageResult<Vec<GiftRecord>> {
        if !self.root.is_dir() {
            return Err(StorageError::NotFound(self.root.display().to_string()));
        }

        let mut paths = Vec::new();
        collect_note_paths(&self.root, &mut paths)?;
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        let mut skipped = 0usize;
        for path in paths {
            let bytes = fs::read(&path)?;
            let content = String::from_utf8(bytes).map_err(|e| {
                StorageError::Parse(format!(
                    "{} is not valid UTF-8 (byte {})",
                    path.display(),
                    e.utf8_error().valid_up_to()
                ))
            })?;
            match self.parse_note(&content) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    tracing::debug!(path = %path.display(), "Note has no gift frontmatter, skipping");
                }
            }
        }

        tracing::info!(
            root = %self.root.display(),
            records = records.len(),
            skipped_notes = skipped,
            "Loaded gift records from notes"
        );

        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Vault
    }
}

/// Recursively collect `.md` file paths, skipping hidden directories such as `.obsidian`.
fn collect_note_paths(path: &Path, out: &mut Vec<PathBuf>) -> StorageResult<()> {
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            let hidden = entry_path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if !hidden {
                collect_note_paths(&entry_path, out)?;
            }
        } else if entry_path.extension().and_then(|s| s.to_str()) == Some("md") {
            out.push(entry_path);
        }
    }
    Ok(())
}

/// Frontmatter of a note as a key/value map.
///
/// The note must open with `---` and the block must be closed by `---` or
/// `...`; anything else, or YAML that is not a mapping, yields `None`.
pub fn frontmatter_fields(content: &str) -> Option<BTreeMap<String, Value>> {
    let mut lines = content.trim_start_matches('\u{feff}').lines();
    if lines.next()?.trim_end() != "---" {
        return None;
    }

    let rest: Vec<&str> = lines.collect();
    let close = rest
        .iter()
        .position(|line| matches!(line.trim_end(), "---" | "..."))?;
    if close == 0 {
        return None;
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(&rest[..close].join("\n")).ok()?;
    match serde_json::to_value(yaml).ok()? {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => normalize_optional(Some(s.as_str())),
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|_| n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // An unquoted [[Name]] parses as a nested list
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(value_to_text).collect();
            normalize_optional(Some(joined.join(", ").as_str()))
        }
        Value::Object(_) => Some(clean_text(&value.to_string())),
    }
}
