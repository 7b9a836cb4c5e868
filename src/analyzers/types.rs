//! Plain records handed to the charting collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a comparison a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The school being analyzed.
    Subject,
    /// The national average baseline.
    Reference,
}

impl Category {
    /// Display label used in chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Category::Subject => "School",
            Category::Reference => "Country",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One plotted value in a year-over-year comparison line chart.
///
/// `value` is `None` when the source had no value for that year; such
/// points are kept so both lines stay aligned but are not plottable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub year: i32,
    pub category: Category,
    pub value: Option<f64>,
}

impl ComparisonPoint {
    pub fn new(year: i32, category: Category, value: Option<f64>) -> Self {
        Self {
            year,
            category,
            value,
        }
    }

    pub fn is_plottable(&self) -> bool {
        self.value.is_some()
    }
}

/// Half-open score interval `[lo, hi)`; the last bin of a layout is also
/// closed at `hi`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub label: String,
}

impl Bin {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            label: format!("{lo}-{hi}"),
        }
    }
}

/// A bin together with its population-local count and share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinCount {
    pub bin: Bin,
    pub raw_count: usize,
    pub normalized_frequency: f64,
}

/// Flattened histogram row: one per (bin, group).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramRow {
    pub bin: String,
    pub group: Category,
    pub raw_count: usize,
    pub normalized_frequency: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_label_uses_plain_numbers() {
        assert_eq!(Bin::new(0.0, 5.0).label, "0-5");
        assert_eq!(Bin::new(95.0, 100.0).label, "95-100");
        assert_eq!(Bin::new(2.5, 5.0).label, "2.5-5");
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Reference).unwrap();
        assert_eq!(json, "\"reference\"");
        assert_eq!(Category::Subject.to_string(), "School");
    }

    #[test]
    fn test_point_without_value_is_not_plottable() {
        assert!(!ComparisonPoint::new(2020, Category::Reference, None).is_plottable());
        assert!(ComparisonPoint::new(2020, Category::Subject, Some(61.0)).is_plottable());
    }
}
