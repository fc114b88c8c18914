//! Test helpers: record builders shared by the report integration tests.
//!
//! Run from workspace root: `cargo test -p giftreg-services`.

pub mod fixtures;

use giftreg_core::GiftRecord;

/// Gift received by `mep`, optionally from `donor`, optionally with a photo.
pub fn gift(number: &str, mep: &str, donor: Option<&str>, photo: Option<&str>) -> GiftRecord {
    let mut record = GiftRecord::new(number, mep, format!("Gift {}", number));
    record.name_of_donor = donor.map(String::from);
    record.link_to_photo = photo.map(String::from);
    record
}

/// Registration numbers of a record list, in order.
pub fn numbers<'a>(records: &[&'a GiftRecord]) -> Vec<&'a str> {
    records
        .iter()
        .map(|r| r.registration_number.as_str())
        .collect()
}
