//! Core comparison transforms.
//!
//! Turns year-indexed school/country mappings into ordered comparison
//! series, separates near-identical values for display, and buckets raw
//! exam scores into chart-aligned, normalized distributions.

pub mod binner;
pub mod jitter;
pub mod series;
pub mod types;
pub mod utility;
