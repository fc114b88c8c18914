//! Validation modules

pub mod record;

pub use record::{partition_valid, validate_record};
