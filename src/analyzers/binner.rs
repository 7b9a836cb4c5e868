//! Fixed-width score histograms with population-local normalization.
//!
//! Every bin of the layout is always present, so two populations binned
//! with the same [`BinSpec`] line up bin-for-bin regardless of how many
//! scores each holds.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::types::{Bin, BinCount, Category, HistogramRow};
use crate::error::CoreError;

pub const DEFAULT_BIN_WIDTH: f64 = 5.0;
pub const DEFAULT_DOMAIN_MAX: f64 = 100.0;
/// Upper bound on the number of bins a layout may have.
pub const MAX_BIN_COUNT: usize = 10_000;

/// Bin layout over `[0, max)`, with the last bin closed at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSpec {
    width: f64,
    max: f64,
}

impl Default for BinSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_BIN_WIDTH,
            max: DEFAULT_DOMAIN_MAX,
        }
    }
}

impl BinSpec {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBinning`] unless both `width` and `max`
    /// are finite and positive and the layout has at most
    /// [`MAX_BIN_COUNT`] bins.
    pub fn new(width: f64, max: f64) -> Result<Self, CoreError> {
        if !(width.is_finite() && max.is_finite() && width > 0.0 && max > 0.0) {
            return Err(CoreError::InvalidBinning { width, max });
        }
        if max / width > MAX_BIN_COUNT as f64 {
            return Err(CoreError::InvalidBinning { width, max });
        }
        Ok(Self { width, max })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of bins: one for every `lo = i * width` with `lo < max`.
    pub fn bin_count(&self) -> usize {
        let mut count = (self.max / self.width).ceil() as usize;
        while count > 1 && (count - 1) as f64 * self.width >= self.max {
            count -= 1;
        }
        count.max(1)
    }

    /// All bins in ascending order; the final `hi` is capped at `max`.
    pub fn bins(&self) -> Vec<Bin> {
        (0..self.bin_count())
            .map(|i| {
                let lo = i as f64 * self.width;
                let hi = ((i + 1) as f64 * self.width).min(self.max);
                Bin::new(lo, hi)
            })
            .collect()
    }

    /// Index of the bin holding `score`, or `None` outside `[0, max]`.
    pub fn index_of(&self, score: f64) -> Option<usize> {
        if !score.is_finite() || score < 0.0 || score > self.max {
            return None;
        }
        let last = self.bin_count() - 1;
        if score == self.max {
            return Some(last);
        }
        Some(((score / self.width).floor() as usize).min(last))
    }
}

/// Histogram of one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedDistribution {
    pub bins: Vec<BinCount>,
    /// Scores that landed in a bin.
    pub total: usize,
    /// Scores outside `[0, max]` or not finite; not part of `total`.
    pub out_of_range: usize,
}

impl BinnedDistribution {
    /// `true` when no score landed in any bin; all frequencies are then 0.
    pub fn is_empty_population(&self) -> bool {
        self.total == 0
    }

    /// # Errors
    ///
    /// Returns [`CoreError::EmptyPopulation`] when nothing was binned.
    pub fn require_population(&self) -> Result<&Self, CoreError> {
        if self.is_empty_population() {
            Err(CoreError::EmptyPopulation)
        } else {
            Ok(self)
        }
    }

    pub fn get(&self, label: &str) -> Option<&BinCount> {
        self.bins.iter().find(|b| b.bin.label == label)
    }

    /// Flattens into chart rows tagged with `group`.
    pub fn rows(&self, group: Category) -> Vec<HistogramRow> {
        self.bins
            .iter()
            .map(|b| HistogramRow {
                bin: b.bin.label.clone(),
                group,
                raw_count: b.raw_count,
                normalized_frequency: b.normalized_frequency,
            })
            .collect()
    }
}

/// Buckets `scores` into the bins of `spec` and normalizes by this
/// population's own total.
pub fn bin(scores: &[f64], spec: &BinSpec) -> BinnedDistribution {
    let layout = spec.bins();
    let mut counts = vec![0usize; layout.len()];
    let mut out_of_range = 0;

    for &score in scores {
        match spec.index_of(score) {
            Some(i) => counts[i] += 1,
            None => out_of_range += 1,
        }
    }

    let total: usize = counts.iter().sum();
    if out_of_range > 0 {
        debug!(out_of_range, total, "Scores outside the bin domain were ignored");
    }

    let bins = layout
        .into_iter()
        .zip(counts)
        .map(|(bin, raw_count)| BinCount {
            bin,
            raw_count,
            normalized_frequency: if total == 0 {
                0.0
            } else {
                raw_count as f64 / total as f64
            },
        })
        .collect();

    BinnedDistribution {
        bins,
        total,
        out_of_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_layout_has_twenty_bins() {
        let bins = BinSpec::default().bins();
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].label, "0-5");
        assert_eq!(bins[19].label, "95-100");
    }

    #[test]
    fn test_scenario_counts_and_frequencies() {
        let dist = bin(&[2.0, 2.0, 7.0, 50.0, 98.0], &BinSpec::default());

        assert_eq!(dist.total, 5);
        assert_eq!(dist.bins.len(), 20);

        let expected = [("0-5", 2, 0.4), ("5-10", 1, 0.2), ("50-55", 1, 0.2), ("95-100", 1, 0.2)];
        for (label, count, freq) in expected {
            let b = dist.get(label).unwrap();
            assert_eq!(b.raw_count, count, "{label}");
            assert!((b.normalized_frequency - freq).abs() < 1e-12, "{label}");
        }

        let others: usize = dist
            .bins
            .iter()
            .filter(|b| !expected.iter().any(|(l, _, _)| *l == b.bin.label))
            .map(|b| b.raw_count)
            .sum();
        assert_eq!(others, 0);
    }

    #[test]
    fn test_lower_edge_is_inclusive() {
        let dist = bin(&[5.0], &BinSpec::default());
        assert_eq!(dist.get("5-10").unwrap().raw_count, 1);
        assert_eq!(dist.get("0-5").unwrap().raw_count, 0);
    }

    #[test]
    fn test_domain_max_lands_in_last_bin() {
        let dist = bin(&[100.0], &BinSpec::default());
        assert_eq!(dist.get("95-100").unwrap().raw_count, 1);
        assert_eq!(dist.out_of_range, 0);
    }

    #[test]
    fn test_out_of_domain_scores_are_counted_separately() {
        let dist = bin(&[-1.0, 100.5, f64::NAN, 10.0], &BinSpec::default());
        assert_eq!(dist.total, 1);
        assert_eq!(dist.out_of_range, 3);
        assert_eq!(dist.get("10-15").unwrap().normalized_frequency, 1.0);
    }

    #[test]
    fn test_empty_population_is_all_zero() {
        let dist = bin(&[], &BinSpec::default());

        assert!(dist.is_empty_population());
        assert_eq!(dist.require_population(), Err(CoreError::EmptyPopulation));
        assert_eq!(dist.bins.len(), 20);
        assert!(dist.bins.iter().all(|b| b.normalized_frequency == 0.0));
    }

    #[test]
    fn test_uneven_width_caps_last_bin() {
        let spec = BinSpec::new(30.0, 100.0).unwrap();
        let labels: Vec<String> = spec.bins().into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["0-30", "30-60", "60-90", "90-100"]);
        assert_eq!(spec.index_of(95.0), Some(3));
    }

    #[test]
    fn test_invalid_spec_rejected() {
        assert!(BinSpec::new(0.0, 100.0).is_err());
        assert!(BinSpec::new(5.0, -1.0).is_err());
        assert!(BinSpec::new(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn test_too_many_bins_rejected() {
        assert_eq!(
            BinSpec::new(1e-15, 100.0),
            Err(CoreError::InvalidBinning {
                width: 1e-15,
                max: 100.0
            })
        );
        assert!(BinSpec::new(0.009, 100.0).is_err());

        let finest = BinSpec::new(0.01, 100.0).unwrap();
        assert_eq!(finest.bin_count(), MAX_BIN_COUNT);
        assert_eq!(bin(&[50.0], &finest).total, 1);
    }

    #[test]
    fn test_rows_tagged_with_group() {
        let dist = bin(&[12.0], &BinSpec::default());
        let rows = dist.rows(Category::Reference);

        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|r| r.group == Category::Reference));
        assert_eq!(rows[2].bin, "10-15");
        assert_eq!(rows[2].raw_count, 1);
    }

    proptest! {
        #[test]
        fn prop_always_twenty_ordered_bins(scores in proptest::collection::vec(0.0f64..=100.0, 0..200)) {
            let dist = bin(&scores, &BinSpec::default());
            prop_assert_eq!(dist.bins.len(), 20);
            for (i, b) in dist.bins.iter().enumerate() {
                prop_assert_eq!(b.bin.lo, i as f64 * 5.0);
            }
            prop_assert_eq!(dist.total, scores.len());
        }

        #[test]
        fn prop_frequencies_sum_to_one(scores in proptest::collection::vec(0.0f64..=100.0, 1..200)) {
            let dist = bin(&scores, &BinSpec::default());
            let sum: f64 = dist.bins.iter().map(|b| b.normalized_frequency).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(!dist.is_empty_population());
        }
    }
}
