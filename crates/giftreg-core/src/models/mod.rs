//! Data models for the gift register
//!
//! Records, grouping keys and report views. Each sub-module covers one concern.

mod gift;
mod group;
mod report;

// Re-export all models for convenient imports
pub use gift::*;
pub use group::*;
pub use report::*;
