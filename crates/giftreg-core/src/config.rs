//! Configuration module
//!
//! Report and export settings, loaded from the environment (and a `.env` file
//! when present). Command-line flags in the binary override these values.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::TieBreak;

const DEFAULT_GIFTS_DIR: &str = "gifts";
const DEFAULT_MEPS_DIR: &str = "meps";
const DEFAULT_DONORS_DIR: &str = "donors";

/// Where gift records are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Delimited-text export of the register spreadsheet
    Csv,
    /// Folder of per-gift Markdown notes with YAML frontmatter
    Vault,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceKind::Csv),
            "vault" | "notes" | "markdown" => Ok(SourceKind::Vault),
            _ => Err(anyhow::anyhow!("Invalid record source: {}", s)),
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SourceKind::Csv => write!(f, "csv"),
            SourceKind::Vault => write!(f, "vault"),
        }
    }
}

/// What to do with records that fail validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordPolicy {
    /// Drop the record, log a warning and continue
    #[default]
    Skip,
    /// Stop at the first malformed record
    Abort,
}

impl FromStr for InvalidRecordPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(InvalidRecordPolicy::Skip),
            "abort" | "fail" => Ok(InvalidRecordPolicy::Abort),
            _ => Err(anyhow::anyhow!("Invalid record policy: {}", s)),
        }
    }
}

/// Rendering of report output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid output format: {}", s)),
        }
    }
}

/// Report generator configuration
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub source: SourceKind,
    /// CSV file or notes directory; falls back to `gifts_dir` for the vault source
    pub input: Option<PathBuf>,
    /// Explicit CSV delimiter; auto-detected from the header line when unset
    pub csv_delimiter: Option<u8>,
    pub gifts_dir: PathBuf,
    pub meps_dir: PathBuf,
    pub donors_dir: PathBuf,
    pub tie_break: TieBreak,
    pub invalid_records: InvalidRecordPolicy,
    pub output_format: OutputFormat,
    /// Limit grouped tables to the first N rows
    pub top_n: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            source: SourceKind::Csv,
            input: None,
            csv_delimiter: None,
            gifts_dir: PathBuf::from(DEFAULT_GIFTS_DIR),
            meps_dir: PathBuf::from(DEFAULT_MEPS_DIR),
            donors_dir: PathBuf::from(DEFAULT_DONORS_DIR),
            tie_break: TieBreak::default(),
            invalid_records: InvalidRecordPolicy::default(),
            output_format: OutputFormat::default(),
            top_n: None,
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ReportConfig::default();

        let source = match lookup("GIFTREG_SOURCE") {
            Some(s) => s.parse()?,
            None => defaults.source,
        };

        let csv_delimiter = match lookup("GIFTREG_CSV_DELIMITER") {
            Some(s) => Some(parse_delimiter(&s)?),
            None => None,
        };

        let tie_break = match lookup("GIFTREG_TIE_BREAK") {
            Some(s) => s.parse::<TieBreak>().map_err(anyhow::Error::from)?,
            None => defaults.tie_break,
        };

        let invalid_records = match lookup("GIFTREG_INVALID_RECORDS") {
            Some(s) => s.parse()?,
            None => defaults.invalid_records,
        };

        let output_format = match lookup("GIFTREG_OUTPUT_FORMAT") {
            Some(s) => s.parse()?,
            None => defaults.output_format,
        };

        let top_n = match lookup("GIFTREG_TOP_N") {
            Some(s) => Some(
                s.trim()
                    .parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("GIFTREG_TOP_N must be a positive number"))?,
            ),
            None => None,
        };

        let config = ReportConfig {
            source,
            input: lookup("GIFTREG_INPUT").map(PathBuf::from),
            csv_delimiter,
            gifts_dir: lookup("GIFTREG_GIFTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.gifts_dir),
            meps_dir: lookup("GIFTREG_MEPS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.meps_dir),
            donors_dir: lookup("GIFTREG_DONORS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.donors_dir),
            tie_break,
            invalid_records,
            output_format,
            top_n,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.top_n == Some(0) {
            return Err(anyhow::anyhow!("GIFTREG_TOP_N must be greater than zero"));
        }
        if self.source == SourceKind::Csv && self.csv_delimiter == Some(b'"') {
            return Err(anyhow::anyhow!("GIFTREG_CSV_DELIMITER cannot be the quote character"));
        }
        if self.meps_dir == self.donors_dir {
            return Err(anyhow::anyhow!(
                "GIFTREG_MEPS_DIR and GIFTREG_DONORS_DIR must differ"
            ));
        }
        Ok(())
    }

    /// Input path for the configured source
    pub fn input_path(&self) -> Option<PathBuf> {
        match self.source {
            SourceKind::Csv => self.input.clone(),
            SourceKind::Vault => Some(self.input.clone().unwrap_or_else(|| self.gifts_dir.clone())),
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, anyhow::Error> {
    match raw {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(anyhow::anyhow!(
            "GIFTREG_CSV_DELIMITER must be a single ASCII character, got '{}'",
            raw
        )),
    }
}
