//! Structural checks for loaded gift records.

use crate::config::InvalidRecordPolicy;
use crate::error::{RecordField, ReportError, ReportResult};
use crate::models::GiftRecord;

/// Check that a record carries its required fields.
///
/// A registration number and an MEP must be present and non-blank. A photo
/// link, when present, must not be blank so that "missing photo" stays
/// distinguishable from an empty placeholder.
pub fn validate_record(record: &GiftRecord) -> ReportResult<()> {
    if record.registration_number.trim().is_empty() {
        return Err(ReportError::missing(RecordField::RegistrationNumber, ""));
    }
    if record.mep().is_none() {
        return Err(ReportError::missing(
            RecordField::NameOfMep,
            &record.registration_number,
        ));
    }
    if matches!(record.link_to_photo.as_deref(), Some(link) if link.trim().is_empty()) {
        return Err(ReportError::missing(
            RecordField::LinkToPhoto,
            &record.registration_number,
        ));
    }
    Ok(())
}

/// Split records into well-formed ones and the rejections.
///
/// With [`InvalidRecordPolicy::Abort`] the first rejection is returned as the
/// error. With [`InvalidRecordPolicy::Skip`] every rejection is logged and
/// collected, and the valid records keep their input order.
pub fn partition_valid(
    records: Vec<GiftRecord>,
    policy: InvalidRecordPolicy,
) -> ReportResult<(Vec<GiftRecord>, Vec<ReportError>)> {
    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        match validate_record(&record) {
            Ok(()) => valid.push(record),
            Err(err) => match policy {
                InvalidRecordPolicy::Abort => return Err(err),
                InvalidRecordPolicy::Skip => {
                    tracing::warn!(error = %err, "Skipping malformed gift record");
                    rejected.push(err);
                }
            },
        }
    }

    tracing::debug!(
        valid = valid.len(),
        rejected = rejected.len(),
        "Validated gift records"
    );

    Ok((valid, rejected))
}
