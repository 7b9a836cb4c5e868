//! Display-only separation of near-identical comparison values.
//!
//! Never apply this to stored or reported numbers; it only keeps two lines
//! from being drawn on top of each other.

use rand::Rng;

use crate::analyzers::types::ComparisonPoint;
use crate::analyzers::utility::clamp_pct;

/// Trigger distance and maximum offset for [`jitter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterConfig {
    pub threshold: f64,
    pub amplitude: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            amplitude: 10.0,
        }
    }
}

/// Perturbs `a` and `b` independently when they are closer than
/// `config.threshold`, clamping both results to `[0, 100]`.
///
/// Values at least `threshold` apart are returned unchanged and no entropy
/// is drawn from `rng`.
pub fn jitter<R: Rng + ?Sized>(a: f64, b: f64, config: &JitterConfig, rng: &mut R) -> (f64, f64) {
    if (a - b).abs() >= config.threshold {
        return (a, b);
    }

    let amplitude = config.amplitude.abs();
    let offset_a = rng.gen_range(-amplitude..=amplitude);
    let offset_b = rng.gen_range(-amplitude..=amplitude);

    (clamp_pct(a + offset_a), clamp_pct(b + offset_b))
}

/// Applies [`jitter`] to each (school, country) pair of a built series.
///
/// Expects the pairwise layout produced by
/// [`build_series`](crate::analyzers::series::build_series); pairs with a
/// missing value are left alone.
pub fn jitter_series<R: Rng + ?Sized>(
    points: &mut [ComparisonPoint],
    config: &JitterConfig,
    rng: &mut R,
) {
    for pair in points.chunks_exact_mut(2) {
        if let (Some(a), Some(b)) = (pair[0].value, pair[1].value) {
            let (a, b) = jitter(a, b, config, rng);
            pair[0].value = Some(a);
            pair[1].value = Some(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Category;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_distant_values_unchanged() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = JitterConfig::default();
        assert_eq!(jitter(60.0, 70.0, &config, &mut rng), (60.0, 70.0));
        assert_eq!(jitter(70.0, 65.0, &config, &mut rng), (70.0, 65.0));
    }

    #[test]
    fn test_close_values_stay_within_amplitude() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = JitterConfig::default();

        for _ in 0..100 {
            let (a, b) = jitter(65.0, 66.0, &config, &mut rng);
            assert!((55.0..=75.0).contains(&a));
            assert!((56.0..=76.0).contains(&b));
        }
    }

    #[test]
    fn test_clamps_at_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = JitterConfig {
            threshold: 5.0,
            amplitude: 50.0,
        };

        for _ in 0..100 {
            let (a, b) = jitter(99.0, 100.0, &config, &mut rng);
            assert!((0.0..=100.0).contains(&a));
            assert!((0.0..=100.0).contains(&b));
        }
    }

    #[test]
    fn test_zero_amplitude_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = JitterConfig {
            threshold: 5.0,
            amplitude: 0.0,
        };
        assert_eq!(jitter(40.0, 41.0, &config, &mut rng), (40.0, 41.0));
    }

    #[test]
    fn test_jitter_series_skips_missing_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut points = vec![
            ComparisonPoint::new(2019, Category::Subject, Some(65.0)),
            ComparisonPoint::new(2019, Category::Reference, None),
            ComparisonPoint::new(2020, Category::Subject, Some(10.0)),
            ComparisonPoint::new(2020, Category::Reference, Some(90.0)),
        ];

        jitter_series(&mut points, &JitterConfig::default(), &mut rng);

        assert_eq!(points[0].value, Some(65.0));
        assert_eq!(points[1].value, None);
        assert_eq!(points[2].value, Some(10.0));
        assert_eq!(points[3].value, Some(90.0));
    }

    proptest! {
        #[test]
        fn prop_output_within_bounds(a in 0.0f64..=100.0, b in 0.0f64..=100.0, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (x, y) = jitter(a, b, &JitterConfig::default(), &mut rng);
            prop_assert!((0.0..=100.0).contains(&x));
            prop_assert!((0.0..=100.0).contains(&y));
        }

        #[test]
        fn prop_distant_inputs_returned_exactly(a in 0.0f64..=100.0, b in 0.0f64..=100.0, seed in any::<u64>()) {
            prop_assume!((a - b).abs() >= 5.0);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            prop_assert_eq!(jitter(a, b, &JitterConfig::default(), &mut rng), (a, b));
        }

        #[test]
        fn prop_same_seed_same_output(a in 0.0f64..=100.0, delta in 0.0f64..5.0, seed in any::<u64>()) {
            let b = (a + delta).min(100.0);
            let config = JitterConfig::default();
            let first = jitter(a, b, &config, &mut ChaCha8Rng::seed_from_u64(seed));
            let second = jitter(a, b, &config, &mut ChaCha8Rng::seed_from_u64(seed));
            prop_assert_eq!(first, second);
        }
    }
}
