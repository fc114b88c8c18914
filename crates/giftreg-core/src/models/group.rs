use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RecordField, ReportError, ReportResult};
use crate::models::GiftRecord;

/// Label under which gifts without a known donor are counted.
pub const UNKNOWN_DONOR: &str = "(unknown donor)";

/// Record attribute a report can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Mep,
    Donor,
}

impl GroupKey {
    /// Select the grouping value of a record.
    ///
    /// The MEP is required, so a record without one is a validation error. The
    /// donor is optional and a missing donor groups under [`UNKNOWN_DONOR`].
    pub fn select<'a>(&self, record: &'a GiftRecord) -> ReportResult<&'a str> {
        match self {
            GroupKey::Mep => record.mep().ok_or_else(|| {
                ReportError::missing(RecordField::NameOfMep, &record.registration_number)
            }),
            GroupKey::Donor => Ok(record.donor().unwrap_or(UNKNOWN_DONOR)),
        }
    }

    pub fn field(&self) -> RecordField {
        match self {
            GroupKey::Mep => RecordField::NameOfMep,
            GroupKey::Donor => RecordField::NameOfDonor,
        }
    }

    /// Column heading used when rendering grouped counts
    pub fn heading(&self) -> &'static str {
        match self {
            GroupKey::Mep => "MEP",
            GroupKey::Donor => "Donor",
        }
    }
}

impl FromStr for GroupKey {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "mep" | "nameofmep" => Ok(GroupKey::Mep),
            "donor" | "nameofdonor" => Ok(GroupKey::Donor),
            _ => Err(ReportError::unknown_group_key(s)),
        }
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            GroupKey::Mep => write!(f, "mep"),
            GroupKey::Donor => write!(f, "donor"),
        }
    }
}

/// Ordering applied between groups with equal counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Keep the order in which keys were first encountered in the input
    #[default]
    FirstSeen,
    /// Order by key, ascending
    Lexicographic,
}

impl FromStr for TieBreak {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-seen" | "first_seen" | "firstseen" => Ok(TieBreak::FirstSeen),
            "lexicographic" | "alphabetical" => Ok(TieBreak::Lexicographic),
            other => Err(ReportError::Configuration(format!(
                "invalid tie-break '{}' (expected 'first-seen' or 'lexicographic')",
                other
            ))),
        }
    }
}

/// Number of records sharing one grouping value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: usize) -> Self {
        GroupCount {
            key: key.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_key_parses_aliases() {
        assert_eq!("mep".parse::<GroupKey>().unwrap(), GroupKey::Mep);
        assert_eq!("NameOfMEP".parse::<GroupKey>().unwrap(), GroupKey::Mep);
        assert_eq!("name_of_donor".parse::<GroupKey>().unwrap(), GroupKey::Donor);
        assert_eq!(" Donor ".parse::<GroupKey>().unwrap(), GroupKey::Donor);
    }

    #[test]
    fn unknown_group_key_is_configuration_error() {
        let err = "location".parse::<GroupKey>().unwrap_err();
        match err {
            ReportError::Configuration(msg) => assert!(msg.contains("'location'")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn select_mep_requires_value() {
        let mut record = GiftRecord::new("G7-23", "A", "Scarf");
        assert_eq!(GroupKey::Mep.select(&record).unwrap(), "A");
        record.name_of_mep = None;
        match GroupKey::Mep.select(&record).unwrap_err() {
            ReportError::Validation {
                field,
                registration_number,
            } => {
                assert_eq!(field, RecordField::NameOfMep);
                assert_eq!(registration_number.as_deref(), Some("G7-23"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn select_donor_defaults_to_unknown() {
        let record = GiftRecord::new("G7-23", "A", "Scarf");
        assert_eq!(GroupKey::Donor.select(&record).unwrap(), UNKNOWN_DONOR);
        let record = record.with_donor("Embassy");
        assert_eq!(GroupKey::Donor.select(&record).unwrap(), "Embassy");
    }

    #[test]
    fn tie_break_parses() {
        assert_eq!("first-seen".parse::<TieBreak>().unwrap(), TieBreak::FirstSeen);
        assert_eq!(
            "Lexicographic".parse::<TieBreak>().unwrap(),
            TieBreak::Lexicographic
        );
        assert!("random".parse::<TieBreak>().is_err());
    }
}
