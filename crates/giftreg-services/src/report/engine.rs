use std::collections::hash_map::Entry;
use std::collections::HashMap;

use giftreg_core::{
    validate_record, GiftRecord, GiftReport, GroupCount, GroupKey, ReportResult, TieBreak,
};

/// Builds report views over a slice of gift records.
///
/// The engine is stateless apart from its tie-break setting: every view is a
/// pure function of the input, borrows from it, and preserves input order
/// where no ordering is imposed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportEngine {
    tie_break: TieBreak,
}

impl ReportEngine {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Records without a photo link, in input order
    pub fn records_missing_photo<'a, I>(&self, records: I) -> Vec<&'a GiftRecord>
    where
        I: IntoIterator<Item = &'a GiftRecord>,
    {
        records.into_iter().filter(|r| !r.has_photo()).collect()
    }

    /// Records with a photo link, in input order
    pub fn records_with_photo<'a, I>(&self, records: I) -> Vec<&'a GiftRecord>
    where
        I: IntoIterator<Item = &'a GiftRecord>,
    {
        records.into_iter().filter(|r| r.has_photo()).collect()
    }

    /// Count records per key and sort by count, descending.
    ///
    /// Every record must pass [`validate_record`] before `key_fn` selects its
    /// grouping value. The first error from either aborts the whole grouping.
    /// Equal counts are ordered by the engine's [`TieBreak`].
    pub fn group_and_count<'a, I, F>(&self, records: I, key_fn: F) -> ReportResult<Vec<GroupCount>>
    where
        I: IntoIterator<Item = &'a GiftRecord>,
        F: Fn(&'a GiftRecord) -> ReportResult<&'a str>,
    {
        let mut counts: Vec<GroupCount> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        let mut total = 0usize;

        for record in records {
            validate_record(record)?;
            let key = key_fn(record)?;
            match positions.entry(key) {
                Entry::Occupied(slot) => counts[*slot.get()].count += 1,
                Entry::Vacant(slot) => {
                    slot.insert(counts.len());
                    counts.push(GroupCount::new(key, 1));
                }
            }
            total += 1;
        }

        self.sort_counts(&mut counts);

        tracing::debug!(
            records = total,
            groups = counts.len(),
            tie_break = ?self.tie_break,
            "Grouped gift records"
        );

        Ok(counts)
    }

    /// Group by one of the built-in keys
    pub fn group_and_count_by<'a, I>(&self, records: I, key: GroupKey) -> ReportResult<Vec<GroupCount>>
    where
        I: IntoIterator<Item = &'a GiftRecord>,
    {
        self.group_and_count(records, |record| key.select(record))
    }

    /// Group by a key given by name (`"mep"`, `"donor"`, `"NameOfMEP"`, ...)
    pub fn group_and_count_named<'a, I>(&self, records: I, key: &str) -> ReportResult<Vec<GroupCount>>
    where
        I: IntoIterator<Item = &'a GiftRecord>,
    {
        let key: GroupKey = key.parse()?;
        self.group_and_count_by(records, key)
    }

    /// All records whose `key` value equals `name`, in input order.
    ///
    /// Malformed records are rejected as in [`Self::group_and_count`].
    ///
    /// Use [`giftreg_core::models::UNKNOWN_DONOR`] as the name to list gifts
    /// without a donor.
    pub fn records_for<'a, I>(
        &self,
        records: I,
        key: GroupKey,
        name: &str,
    ) -> ReportResult<Vec<&'a GiftRecord>>
    where
        I: IntoIterator<Item = &'a GiftRecord>,
    {
        let name = name.trim();
        let mut matched = Vec::new();
        for record in records {
            validate_record(record)?;
            if key.select(record)? == name {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    /// Every view over the same records
    pub fn build_report<'a>(&self, records: &'a [GiftRecord]) -> ReportResult<GiftReport<'a>> {
        let report = GiftReport {
            total: records.len(),
            missing_photo: self.records_missing_photo(records),
            with_photo: self.records_with_photo(records),
            by_mep: self.group_and_count_by(records, GroupKey::Mep)?,
            by_donor: self.group_and_count_by(records, GroupKey::Donor)?,
        };

        tracing::info!(
            total = report.total,
            missing_photo = report.missing_photo.len(),
            meps = report.by_mep.len(),
            donors = report.by_donor.len(),
            "Built gift report"
        );

        Ok(report)
    }

    // sort_by is stable, so FirstSeen keeps insertion order among equal counts
    fn sort_counts(&self, counts: &mut [GroupCount]) {
        match self.tie_break {
            TieBreak::FirstSeen => counts.sort_by(|a, b| b.count.cmp(&a.count)),
            TieBreak::Lexicographic => {
                counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftreg_core::models::UNKNOWN_DONOR;
    use giftreg_core::{RecordField, ReportError};

    fn gift(number: &str, mep: &str, donor: Option<&str>) -> GiftRecord {
        let record = GiftRecord::new(number, mep, "Gift");
        match donor {
            Some(donor) => record.with_donor(donor),
            None => record,
        }
    }

    fn keys(counts: &[GroupCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.key.as_str(), c.count)).collect()
    }

    #[test]
    fn first_seen_keeps_encounter_order_among_ties() {
        let records = vec![
            gift("G1-23", "Zed", None),
            gift("G2-23", "Amy", None),
            gift("G3-23", "Bob", None),
            gift("G4-23", "Bob", None),
        ];
        let counts = ReportEngine::default()
            .group_and_count_by(&records, GroupKey::Mep)
            .unwrap();
        assert_eq!(keys(&counts), vec![("Bob", 2), ("Zed", 1), ("Amy", 1)]);
    }

    #[test]
    fn lexicographic_orders_ties_by_key() {
        let records = vec![
            gift("G1-23", "Zed", None),
            gift("G2-23", "Amy", None),
            gift("G3-23", "Bob", None),
            gift("G4-23", "Bob", None),
        ];
        let counts = ReportEngine::new(TieBreak::Lexicographic)
            .group_and_count_by(&records, GroupKey::Mep)
            .unwrap();
        assert_eq!(keys(&counts), vec![("Bob", 2), ("Amy", 1), ("Zed", 1)]);
    }

    #[test]
    fn missing_donor_counts_as_unknown() {
        let records = vec![
            gift("G1-23", "A", Some("Acme")),
            gift("G2-23", "A", None),
            gift("G3-23", "B", None),
        ];
        let counts = ReportEngine::default()
            .group_and_count_by(&records, GroupKey::Donor)
            .unwrap();
        assert_eq!(keys(&counts), vec![(UNKNOWN_DONOR, 2), ("Acme", 1)]);
    }

    #[test]
    fn custom_key_selector() {
        let mut records = vec![gift("G1-23", "A", None), gift("G2-23", "B", None)];
        records[0].capacity = Some("Member".into());
        records[1].capacity = Some("Member".into());
        let counts = ReportEngine::default()
            .group_and_count(&records, |r| {
                r.capacity
                    .as_deref()
                    .ok_or_else(|| ReportError::missing(RecordField::Capacity, &r.registration_number))
            })
            .unwrap();
        assert_eq!(keys(&counts), vec![("Member", 2)]);
    }

    #[test]
    fn records_for_selects_one_group() {
        let records = vec![
            gift("G1-23", "A", Some("Acme")),
            gift("G2-23", "B", Some("Acme")),
            gift("G3-23", "A", None),
        ];
        let engine = ReportEngine::default();

        let for_a = engine.records_for(&records, GroupKey::Mep, "A").unwrap();
        let numbers: Vec<_> = for_a.iter().map(|r| r.registration_number.as_str()).collect();
        assert_eq!(numbers, vec!["G1-23", "G3-23"]);

        let unknown = engine
            .records_for(&records, GroupKey::Donor, UNKNOWN_DONOR)
            .unwrap();
        assert_eq!(unknown.len(), 1);
        assert!(engine
            .records_for(&records, GroupKey::Donor, "Nobody")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn build_report_collects_all_views() {
        let records = vec![
            gift("G1-23", "A", Some("Acme")).with_photo("p.jpg"),
            gift("G2-23", "A", None),
            gift("G3-23", "B", Some("Acme")),
            gift("G4-23", "C", Some("Town")).with_photo("q.jpg"),
        ];
        let report = ReportEngine::default().build_report(&records).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.missing_photo.len(), 2);
        assert_eq!(report.with_photo.len(), 2);
        assert_eq!(report.by_mep[0], GroupCount::new("A", 2));
        assert_eq!(report.by_donor[0], GroupCount::new("Acme", 2));
        assert!((report.photo_coverage_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_registration_number_is_rejected_when_grouping() {
        let records = vec![GiftRecord::new("", "A", "Book"), gift("G2-23", "A", None)];
        match ReportEngine::default()
            .group_and_count_by(&records, GroupKey::Mep)
            .unwrap_err()
        {
            ReportError::Validation {
                field,
                registration_number,
            } => {
                assert_eq!(field, RecordField::RegistrationNumber);
                assert!(registration_number.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_mep_is_rejected_when_grouping_by_donor() {
        let mut records = vec![gift("G1-23", "A", Some("Acme"))];
        records[0].name_of_mep = None;
        let engine = ReportEngine::default();
        for err in [
            engine
                .group_and_count_by(&records, GroupKey::Donor)
                .unwrap_err(),
            engine
                .records_for(&records, GroupKey::Donor, "Acme")
                .unwrap_err(),
        ] {
            assert!(matches!(
                err,
                ReportError::Validation { field: RecordField::NameOfMep, registration_number: Some(ref n) } if n == "G1-23"
            ));
        }
    }

    #[test]
    fn blank_photo_link_counts_as_missing() {
        let records = vec![gift("G1-23", "A", None).with_photo(""), gift("G2-23", "A", None).with_photo("p.jpg")];
        let engine = ReportEngine::default();
        assert_eq!(engine.records_missing_photo(&records).len(), 1);
        assert_eq!(engine.records_with_photo(&records)[0].registration_number, "G2-23");
    }

    #[test]
    fn build_report_fails_on_missing_mep() {
        let mut records = vec![gift("G1-23", "A", None), gift("G2-23", "B", None)];
        records[1].name_of_mep = Some("   ".into());
        let err = ReportEngine::default().build_report(&records).unwrap_err();
        assert!(err.to_string().contains("G2-23"));
    }
}
