use crate::traits::{RecordSource, StorageError, StorageResult};
use crate::SourceKind;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use giftreg_core::error::RecordField;
use giftreg_core::models::{clean_text, normalize_optional, parse_register_date};
use giftreg_core::GiftRecord;
use std::path::{Path, PathBuf};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Delimited-text export of the register spreadsheet
///
/// The first line is the header. Columns are matched by name when the header
/// carries the register column names, and by position in register order
/// otherwise. Title rows, rows left over from merged cells and repeated
/// header rows (one per page of the source document) are skipped.
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: Option<u8>,
}

impl CsvSource {
    /// Create a new CsvSource
    ///
    /// # Arguments
    /// * `path` - CSV file to read
    /// * `delimiter` - Field delimiter; detected from the header line when `None`
    pub fn new(path: impl Into<PathBuf>, delimiter: Option<u8>) -> Self {
        CsvSource {
            path: path.into(),
            delimiter,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse register rows from CSV text.
    pub fn parse_str(&self, content: &str) -> StorageResult<Vec<GiftRecord>> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(content.lines().next().unwrap_or_default()));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut rows = reader.records();
        let header = match rows.next() {
            Some(header) => header?,
            None => return Ok(Vec::new()),
        };
        let columns = ColumnMap::from_header(&header);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (idx, row) in rows.enumerate() {
            let row = row?;
            if is_sparse_row(&row) || is_header_row(&row, &header) {
                skipped += 1;
                continue;
            }
            // +2: header line and 1-based numbering
            records.push(columns.to_record(&row, idx + 2));
        }

        tracing::info!(
            path = %self.path.display(),
            delimiter = %char::from(delimiter),
            by_name = columns.by_name,
            records = records.len(),
            skipped_rows = skipped,
            "Loaded gift records from CSV export"
        );

        Ok(records)
    }
}

impl RecordSource for CsvSource {
    fn load(&self) -> StorageResult<Vec<GiftRecord>> {
        if !self.path.is_file() {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }
        let bytes = std::fs::read(&self.path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            StorageError::Parse(format!(
                "{} is not valid UTF-8 (byte {}); re-export the register as UTF-8",
                self.path.display(),
                e.utf8_error().valid_up_to()
            ))
        })?;
        self.parse_str(&content)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Csv
    }
}

/// Pick the candidate delimiter that occurs most often in the header line.
fn detect_delimiter(header_line: &str) -> u8 {
    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .max_by_key(|d| header_line.bytes().filter(|b| b == d).count())
        .filter(|d| header_line.as_bytes().contains(d))
        .unwrap_or(b',')
}

/// Rows with fewer than two filled cells are document titles or merged-cell residue.
fn is_sparse_row(row: &StringRecord) -> bool {
    row.iter().filter(|cell| !cell.trim().is_empty()).count() < 2
}

/// Repeated header rows, either identical to the first line or starting with
/// the registration number heading.
fn is_header_row(row: &StringRecord, header: &StringRecord) -> bool {
    if row.len() == header.len() && row.iter().zip(header.iter()).all(|(a, b)| a == b) {
        return true;
    }
    row.get(0)
        .map(|first| {
            let squashed: String = first
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            squashed.starts_with("registration")
        })
        .unwrap_or(false)
}

struct ColumnMap {
    indices: Vec<(RecordField, usize)>,
    by_name: bool,
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Self {
        let named: Vec<(RecordField, usize)> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| RecordField::from_column_name(name).map(|f| (f, idx)))
            .collect();
        let has = |field: RecordField| named.iter().any(|(f, _)| *f == field);

        if has(RecordField::RegistrationNumber) && has(RecordField::NameOfMep) {
            ColumnMap {
                indices: named,
                by_name: true,
            }
        } else {
            ColumnMap {
                indices: RecordField::ALL
                    .into_iter()
                    .enumerate()
                    .map(|(idx, f)| (f, idx))
                    .collect(),
                by_name: false,
            }
        }
    }

    fn cell<'r>(&self, row: &'r StringRecord, field: RecordField) -> Option<&'r str> {
        self.indices
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, idx)| row.get(*idx))
    }

    fn text(&self, row: &StringRecord, field: RecordField) -> Option<String> {
        normalize_optional(self.cell(row, field))
    }

    fn date(&self, row: &StringRecord, field: RecordField, line: usize) -> Option<NaiveDateTime> {
        let raw = self.text(row, field)?;
        let parsed = parse_register_date(&raw);
        if parsed.is_none() {
            tracing::debug!(line, column = %field, value = %raw, "Unparseable date coerced to empty");
        }
        parsed
    }

    fn to_record(&self, row: &StringRecord, line: usize) -> GiftRecord {
        GiftRecord {
            registration_number: self
                .cell(row, RecordField::RegistrationNumber)
                .map(clean_text)
                .unwrap_or_default(),
            name_of_mep: self.text(row, RecordField::NameOfMep),
            capacity: self.text(row, RecordField::Capacity),
            name_of_donor: self.text(row, RecordField::NameOfDonor),
            description_of_gift: self
                .text(row, RecordField::DescriptionOfGift)
                .unwrap_or_default(),
            estimated_value: self.text(row, RecordField::EstimatedValue),
            link_to_photo: self.text(row, RecordField::LinkToPhoto),
            date_of_reception: self.date(row, RecordField::DateOfReception, line),
            date_of_notification: self.date(row, RecordField::DateOfNotification, line),
            location: self.text(row, RecordField::Location),
            miscellaneous: self.text(row, RecordField::Miscellaneous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONAL: &str = "\
Register of gifts 2023,,,,,,,,,,
Registration number,Name of MEP,Capacity,Donor,Description,Value,Photo,Received,Notified,Location,Misc
G1-23,Jane Doe,Member,Embassy of X,\"Book
with dedication\",< 150 EUR,https://example.org/g1.jpg,17/05/2023,2023-05-20,Brussels,
G2-23,Jane Doe,Member,,Scarf,,,not a date,,,
Registration number,Name of MEP,Capacity,Donor,Description,Value,Photo,Received,Notified,Location,Misc
G3-23,John Roe,Chair,City of Y,Vase,nan,None,,,,
";

    #[test]
    fn positional_export_is_cleaned() {
        let source = CsvSource::new("register.csv", None);
        let records = source.parse_str(POSITIONAL).unwrap();
        let numbers: Vec<_> = records
            .iter()
            .map(|r| r.registration_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["G1-23", "G2-23", "G3-23"]);

        let first = &records[0];
        assert_eq!(first.mep(), Some("Jane Doe"));
        assert_eq!(first.description_of_gift, "Book with dedication");
        assert_eq!(first.link_to_photo.as_deref(), Some("https://example.org/g1.jpg"));
        assert_eq!(
            first.date_of_reception.map(|d| d.to_string()),
            Some("2023-05-17 00:00:00".to_string())
        );
        assert!(first.miscellaneous.is_none());

        let second = &records[1];
        assert!(second.name_of_donor.is_none());
        assert!(second.link_to_photo.is_none());
        assert!(second.date_of_reception.is_none());

        let third = &records[2];
        assert!(third.estimated_value.is_none());
        assert!(third.link_to_photo.is_none());
    }

    #[test]
    fn named_columns_allow_any_order() {
        let content = "\
NameOfMEP;RegistrationNumber;LinkToPhoto;NameOfDonor;DescriptionOfGift
Jane Doe;G1-23;p.jpg;Acme;Book
John Roe;G2-23;;;Pen
";
        let records = CsvSource::new("r.csv", None).parse_str(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].registration_number, "G1-23");
        assert_eq!(records[0].mep(), Some("Jane Doe"));
        assert_eq!(records[0].link_to_photo.as_deref(), Some("p.jpg"));
        assert_eq!(records[1].donor(), None);
        assert!(records[1].capacity.is_none());
    }

    #[test]
    fn delimiter_detection_prefers_most_frequent() {
        assert_eq!(detect_delimiter("a;b;c,d"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn empty_file_yields_no_records() {
        let records = CsvSource::new("r.csv", None).parse_str("").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvSource::new(dir.path().join("absent.csv"), None);
        assert!(matches!(source.load(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn non_utf8_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(&path, b"RegistrationNumber,NameOfMEP\nG1-23,Soci\xe9t\xe9\n").unwrap();
        let source = CsvSource::new(&path, None);
        assert!(matches!(source.load(), Err(StorageError::Parse(_))));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("register.csv");
        std::fs::write(&path, POSITIONAL).unwrap();
        let source = CsvSource::new(&path, Some(b','));
        assert_eq!(source.load().unwrap().len(), 3);
        assert_eq!(source.kind(), SourceKind::Csv);
    }
}
