//! Giftreg Services Layer
//!
//! This crate is the **report layer**: it turns an in-memory slice of gift
//! records into the register views (gifts missing a photo, gifts with a photo,
//! counts per MEP and per donor). It performs no I/O; loading lives in
//! giftreg-storage and rendering in the CLI.

pub mod report;

pub use giftreg_core::{GiftRecord, GiftReport, GroupCount, GroupKey, ReportError, TieBreak};
pub use report::ReportEngine;
