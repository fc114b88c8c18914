//! Test fixtures: small registers in the shapes the loaders accept.

use super::gift;
use giftreg_core::GiftRecord;

/// MEP "A" with three gifts (two without a photo) and MEP "B" with one.
pub fn two_meps() -> Vec<GiftRecord> {
    vec![
        gift("G1-23", "A", Some("Embassy of X"), None),
        gift("G2-23", "A", Some("City of Y"), Some("https://example.org/g2.jpg")),
        gift("G3-23", "B", Some("Embassy of X"), Some("https://example.org/g3.jpg")),
        gift("G4-23", "A", None, None),
    ]
}

/// Register export as published: a title row, the header, data rows and a
/// header repeated at a page break.
pub const REGISTER_CSV: &str = "\
Register of gifts received by Members,,,,,,,,,,
Registration number,Name of MEP,Capacity,Name of donor,Description,Estimated value,Photo,Date of reception,Date of notification,Location,Miscellaneous
G1-24,Jane Doe,Member,Embassy of X,\"Book,
signed\",< 150 EUR,,12/01/2024,15/01/2024,Brussels,
G2-24,Jane Doe,Member,,Scarf,< 150 EUR,https://example.org/g2.jpg,20/01/2024,,Strasbourg,
,,,,,,,,,,
Registration number,Name of MEP,Capacity,Name of donor,Description,Estimated value,Photo,Date of reception,Date of notification,Location,Miscellaneous
G3-24,John Roe,Vice-Chair,City of Y,Vase,> 150 EUR,nan,02/02/2024,,Brussels,Kept in office
G4-24,Jane Doe,Member,City of Y,Tea set,,None,,,,
";

/// Varied record sets the report properties must hold for, each with a label.
pub fn property_cases() -> Vec<(&'static str, Vec<GiftRecord>)> {
    let photo = Some("https://example.org/p.jpg");
    vec![
        ("empty", Vec::new()),
        ("single record", vec![gift("G1-23", "A", Some("X"), None)]),
        (
            "all with photo",
            vec![
                gift("G1-23", "A", Some("X"), photo),
                gift("G2-23", "B", Some("Y"), photo),
                gift("G3-23", "A", None, photo),
            ],
        ),
        (
            "all without photo",
            vec![
                gift("G1-23", "A", None, None),
                gift("G2-23", "A", None, None),
                gift("G3-23", "C", Some("Y"), None),
            ],
        ),
        (
            "many-way ties",
            ["D", "B", "E", "A", "C", "B", "E", "A", "D", "C"]
                .iter()
                .enumerate()
                .map(|(i, mep)| {
                    let donor = ["P", "Q", "R", "S", "T"][i % 5];
                    gift(&format!("G{}-23", i + 1), mep, Some(donor), (i % 2 == 0).then_some("p.jpg"))
                })
                .collect(),
        ),
        (
            "mostly unknown donors",
            vec![
                gift("G1-24", "A", None, None),
                gift("G2-24", "B", None, photo),
                gift("G3-24", "A", Some("X"), None),
                gift("G4-24", "C", None, None),
                gift("G5-24", "B", None, photo),
            ],
        ),
        ("two MEPs", two_meps()),
        ("register export", register_records()),
    ]
}

/// Records parsed from [`REGISTER_CSV`].
pub fn register_records() -> Vec<GiftRecord> {
    giftreg_storage::CsvSource::new("register.csv", None)
        .parse_str(REGISTER_CSV)
        .unwrap()
}
