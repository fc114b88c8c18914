use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Values the register export uses for "no value" in place of an empty cell.
const ABSENT_MARKERS: [&str; 6] = ["", "none", "nan", "nat", "null", "~"];

/// One registered gift received by a Member of the European Parliament.
///
/// Field names serialize as the register column headers so JSON output and
/// note frontmatter use the same keys as the source spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftRecord {
    #[serde(rename = "RegistrationNumber")]
    pub registration_number: String,
    #[serde(rename = "NameOfMEP", default)]
    pub name_of_mep: Option<String>,
    #[serde(rename = "Capacity", default)]
    pub capacity: Option<String>,
    #[serde(rename = "NameOfDonor", default)]
    pub name_of_donor: Option<String>,
    #[serde(rename = "DescriptionOfGift", default)]
    pub description_of_gift: String,
    #[serde(rename = "EstimatedValue", default)]
    pub estimated_value: Option<String>,
    /// `None` means the photo is missing; never `Some("")` once loaded.
    #[serde(rename = "LinkToPhoto", default)]
    pub link_to_photo: Option<String>,
    #[serde(rename = "DateOfReception", default)]
    pub date_of_reception: Option<NaiveDateTime>,
    #[serde(rename = "DateOfNotification", default)]
    pub date_of_notification: Option<NaiveDateTime>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Miscellaneous", default)]
    pub miscellaneous: Option<String>,
}

impl GiftRecord {
    /// Create a record with the required fields set and everything else absent.
    pub fn new(
        registration_number: impl Into<String>,
        name_of_mep: impl Into<String>,
        description_of_gift: impl Into<String>,
    ) -> Self {
        GiftRecord {
            registration_number: registration_number.into(),
            name_of_mep: Some(name_of_mep.into()),
            capacity: None,
            name_of_donor: None,
            description_of_gift: description_of_gift.into(),
            estimated_value: None,
            link_to_photo: None,
            date_of_reception: None,
            date_of_notification: None,
            location: None,
            miscellaneous: None,
        }
    }

    pub fn with_donor(mut self, donor: impl Into<String>) -> Self {
        self.name_of_donor = Some(donor.into());
        self
    }

    pub fn with_photo(mut self, link: impl Into<String>) -> Self {
        self.link_to_photo = Some(link.into());
        self
    }

    /// A blank link counts as no photo.
    pub fn has_photo(&self) -> bool {
        non_blank(self.link_to_photo.as_deref()).is_some()
    }

    /// Receiving MEP, if present and not blank
    pub fn mep(&self) -> Option<&str> {
        non_blank(self.name_of_mep.as_deref())
    }

    /// Donor, if present and not blank
    pub fn donor(&self) -> Option<&str> {
        non_blank(self.name_of_donor.as_deref())
    }

    /// Year encoded in the registration number suffix (`G12-23` -> 2023).
    pub fn registration_year(&self) -> Option<i32> {
        let suffix = self.registration_number.trim().rsplit_once('-')?.1;
        if !suffix.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match suffix.len() {
            2 => suffix.parse::<i32>().ok().map(|yy| 2000 + yy),
            4 => suffix.parse().ok(),
            _ => None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Replace line breaks with spaces and trim the result.
pub fn clean_text(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

/// Normalise a raw cell into an optional value.
///
/// Blank cells and the placeholders spreadsheet exports write for missing
/// values (`None`, `nan`, `NaT`, ...) become `None`.
pub fn normalize_optional(raw: Option<&str>) -> Option<String> {
    let cleaned = clean_text(raw?);
    if ABSENT_MARKERS
        .iter()
        .any(|marker| cleaned.eq_ignore_ascii_case(marker))
    {
        None
    } else {
        Some(cleaned)
    }
}

/// Parse a register date, accepting ISO 8601 and the common export layouts.
///
/// Unparseable values yield `None` rather than an error.
pub fn parse_register_date(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M"];
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];

    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                chrono::NaiveDate::parse_from_str(raw, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
}

/// Format a date the way the register notes store it.
pub fn format_register_date(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}
