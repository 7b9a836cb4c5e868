//! Builds ordered school-vs-country comparison series.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::analyzers::types::{Category, ComparisonPoint};
use crate::error::{CoreError, parse_year};

/// Year key (as found in the source) to an optional percentage.
pub type YearSeries = BTreeMap<String, Option<f64>>;

/// What to do when a school year has no entry in the reference mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingReferencePolicy {
    /// Reject the whole series with [`CoreError::MissingReferenceYear`].
    #[default]
    Fail,
    /// Emit the reference point with no value so it is skipped when plotted.
    MarkUnplottable,
}

/// Converts a school mapping and a country mapping into one ordered series.
///
/// The school mapping's years are authoritative. Output is sorted by integer
/// year and carries a [`Category::Subject`] point followed by a
/// [`Category::Reference`] point for every year.
///
/// # Errors
///
/// Returns [`CoreError::InvalidYear`] for a non-integer year key in either
/// mapping, and [`CoreError::MissingReferenceYear`] under
/// [`MissingReferencePolicy::Fail`].
pub fn build_series(
    subject: &YearSeries,
    reference: &YearSeries,
    policy: MissingReferencePolicy,
) -> Result<Vec<ComparisonPoint>, CoreError> {
    let reference_by_year = reference
        .iter()
        .map(|(key, value)| Ok((parse_year(key)?, *value)))
        .collect::<Result<HashMap<i32, Option<f64>>, CoreError>>()?;

    let mut years = subject
        .iter()
        .map(|(key, value)| Ok((parse_year(key)?, *value)))
        .collect::<Result<Vec<(i32, Option<f64>)>, CoreError>>()?;
    years.sort_by_key(|(year, _)| *year);

    let mut points = Vec::with_capacity(years.len() * 2);
    for (year, subject_value) in years {
        let reference_value = match reference_by_year.get(&year) {
            Some(value) => *value,
            None => match policy {
                MissingReferencePolicy::Fail => {
                    return Err(CoreError::MissingReferenceYear { year });
                }
                MissingReferencePolicy::MarkUnplottable => {
                    debug!(year, "Reference year missing, marking point unplottable");
                    None
                }
            },
        };

        points.push(ComparisonPoint::new(year, Category::Subject, subject_value));
        points.push(ComparisonPoint::new(year, Category::Reference, reference_value));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, f64)]) -> YearSeries {
        pairs.iter().map(|(k, v)| (k.to_string(), Some(*v))).collect()
    }

    #[test]
    fn test_orders_by_integer_year() {
        let subject = series(&[("2021", 1.0), ("2019", 2.0), ("2020", 3.0)]);
        let reference = series(&[("2019", 20.0), ("2020", 30.0), ("2021", 10.0)]);

        let points = build_series(&subject, &reference, MissingReferencePolicy::Fail).unwrap();

        let years: Vec<i32> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2019, 2019, 2020, 2020, 2021, 2021]);
        assert_eq!(points[0], ComparisonPoint::new(2019, Category::Subject, Some(2.0)));
        assert_eq!(points[1], ComparisonPoint::new(2019, Category::Reference, Some(20.0)));
        assert_eq!(points[5], ComparisonPoint::new(2021, Category::Reference, Some(10.0)));
    }

    #[test]
    fn test_integer_order_not_string_order() {
        // "999" sorts after "2020" lexically but before it numerically
        let subject = series(&[("2020", 1.0), ("999", 2.0)]);
        let reference = series(&[("2020", 1.0), ("999", 2.0)]);

        let points = build_series(&subject, &reference, MissingReferencePolicy::Fail).unwrap();
        assert_eq!(points[0].year, 999);
    }

    #[test]
    fn test_missing_reference_year_fails_by_default() {
        let subject = series(&[("2019", 68.0), ("2011", 67.0)]);
        let reference = series(&[("2019", 70.0), ("2021", 70.0)]);

        let result = build_series(&subject, &reference, MissingReferencePolicy::default());
        assert_eq!(result, Err(CoreError::MissingReferenceYear { year: 2011 }));
    }

    #[test]
    fn test_missing_reference_year_marked_unplottable() {
        let subject = series(&[("2019", 68.0), ("2011", 67.0)]);
        let reference = series(&[("2019", 70.0)]);

        let points =
            build_series(&subject, &reference, MissingReferencePolicy::MarkUnplottable).unwrap();

        assert_eq!(points.len(), 4);
        assert_eq!(points[0].year, 2011);
        assert!(points[0].is_plottable());
        assert!(!points[1].is_plottable());
        assert_eq!(points[3].value, Some(70.0));
    }

    #[test]
    fn test_reference_only_years_are_ignored() {
        let subject = series(&[("2020", 50.0)]);
        let reference = series(&[("2019", 40.0), ("2020", 45.0), ("2021", 47.0)]);

        let points = build_series(&subject, &reference, MissingReferencePolicy::Fail).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_absent_values_pass_through() {
        let mut subject = series(&[("2020", 50.0)]);
        subject.insert("2021".to_string(), None);
        let reference = series(&[("2020", 45.0), ("2021", 47.0)]);

        let points = build_series(&subject, &reference, MissingReferencePolicy::Fail).unwrap();
        assert_eq!(points[2], ComparisonPoint::new(2021, Category::Subject, None));
    }

    #[test]
    fn test_invalid_year_key_rejected() {
        let subject = series(&[("twenty", 50.0)]);
        let reference = series(&[("2020", 45.0)]);

        let result = build_series(&subject, &reference, MissingReferencePolicy::Fail);
        assert_eq!(result, Err(CoreError::InvalidYear("twenty".to_string())));
    }
}
