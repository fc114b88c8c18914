//! Report engine
//!
//! This module provides the photo filters and grouped counts over gift records.

pub use engine::ReportEngine;

mod engine;
