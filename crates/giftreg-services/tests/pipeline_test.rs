//! End-to-end tests: register export on disk -> loader -> report.
//!
//! Run with: `cargo test -p giftreg-services --test pipeline_test`

mod helpers;

use giftreg_core::{partition_valid, GroupCount, GroupKey, InvalidRecordPolicy};
use giftreg_services::ReportEngine;
use giftreg_storage::{CsvSource, NoteWriter, RecordSource, VaultSource};
use helpers::{fixtures, numbers};

fn load_register() -> Vec<giftreg_core::GiftRecord> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("register.csv");
    std::fs::write(&path, fixtures::REGISTER_CSV).unwrap();
    CsvSource::new(&path, None).load().unwrap()
}

#[test]
fn test_csv_register_report() {
    let records = load_register();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].description_of_gift, "Book, signed");

    let engine = ReportEngine::default();
    assert_eq!(
        numbers(&engine.records_missing_photo(&records)),
        vec!["G1-24", "G3-24", "G4-24"]
    );
    assert_eq!(
        engine.group_and_count_by(&records, GroupKey::Mep).unwrap(),
        vec![GroupCount::new("Jane Doe", 3), GroupCount::new("John Roe", 1)]
    );
    assert_eq!(
        engine.group_and_count_by(&records, GroupKey::Donor).unwrap(),
        vec![
            GroupCount::new("City of Y", 2),
            GroupCount::new("Embassy of X", 1),
            GroupCount::new("(unknown donor)", 1),
        ]
    );
}

#[test]
fn test_exported_notes_give_the_same_report() {
    let records = load_register();
    let (valid, rejected) = partition_valid(records, InvalidRecordPolicy::Abort).unwrap();
    assert!(rejected.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let gifts = dir.path().join("gifts");
    let writer = NoteWriter::new(&gifts, dir.path().join("meps"), dir.path().join("donors"));
    let summary = writer.export(&valid).unwrap();
    assert_eq!(summary.gift_notes, 4);
    assert_eq!(summary.mep_notes, 2);
    assert_eq!(summary.donor_notes, 2);

    let reloaded = VaultSource::new(&gifts).unwrap().load().unwrap();
    assert_eq!(reloaded, valid);

    let engine = ReportEngine::default();
    let from_csv = engine.build_report(&valid).unwrap();
    let from_notes = engine.build_report(&reloaded).unwrap();
    assert_eq!(from_csv.by_mep, from_notes.by_mep);
    assert_eq!(from_csv.by_donor, from_notes.by_donor);
    assert_eq!(numbers(&from_csv.missing_photo), numbers(&from_notes.missing_photo));
}
