use serde::Serialize;

use crate::models::{GiftRecord, GroupCount};

/// All report views over one record set.
///
/// Views borrow from the input records; nothing is copied or mutated.
#[derive(Debug, Clone, Serialize)]
pub struct GiftReport<'a> {
    pub total: usize,
    pub missing_photo: Vec<&'a GiftRecord>,
    pub with_photo: Vec<&'a GiftRecord>,
    pub by_mep: Vec<GroupCount>,
    pub by_donor: Vec<GroupCount>,
}

impl GiftReport<'_> {
    /// Share of records that carry a photo link, in percent
    pub fn photo_coverage_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.with_photo.len() as f64) * 100.0 / (self.total as f64)
        }
    }
}
