//! School-vs-country exam score comparison.
//!
//! The school and country populations are binned independently with the
//! same layout; frequencies, not counts, are what the chart compares.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzers::binner::{BinSpec, BinnedDistribution, bin};
use crate::analyzers::types::{Category, HistogramRow};
use crate::analyzers::utility::{mean, stddev};
use crate::error::CoreError;
use crate::exams::{ExamTable, SchoolLevel};

/// The filter choices behind one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamSelection {
    pub school: String,
    pub year: String,
    pub level: SchoolLevel,
    /// Resolved exam display name.
    pub exam: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationSummary {
    pub participants: usize,
    pub mean_score: f64,
    pub stddev: f64,
}

impl PopulationSummary {
    /// Summarizes the scores `spec` would bin; the rest are left out so the
    /// participant count matches the distribution total.
    fn from_scores(scores: &[f64], spec: &BinSpec) -> Self {
        let binned: Vec<f64> = scores
            .iter()
            .copied()
            .filter(|s| spec.index_of(*s).is_some())
            .collect();
        let m = mean(&binned);
        Self {
            participants: binned.len(),
            mean_score: m,
            stddev: stddev(&binned, m),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamReport {
    pub generated_at: DateTime<Utc>,
    pub selection: ExamSelection,
    pub address: Option<String>,
    pub school_summary: PopulationSummary,
    pub country_summary: PopulationSummary,
    pub school: BinnedDistribution,
    pub country: BinnedDistribution,
}

impl ExamReport {
    /// Chart rows: every school bin, then every country bin.
    pub fn histogram_rows(&self) -> Vec<HistogramRow> {
        let mut rows = self.school.rows(Category::Subject);
        rows.extend(self.country.rows(Category::Reference));
        rows
    }
}

/// Bins one school's results for `selection` against the whole country.
///
/// The country population is every row of the same year and exam,
/// regardless of school or grade level.
///
/// # Errors
///
/// [`CoreError::UnknownSchool`] when the school has no rows, and
/// [`CoreError::EmptyPopulation`] when the school has no scores for the
/// selection. An empty country population is only flagged on the report.
pub fn build_report(
    table: &ExamTable,
    selection: ExamSelection,
    spec: &BinSpec,
) -> Result<ExamReport, CoreError> {
    if !table.records.iter().any(|r| r.institution == selection.school) {
        return Err(CoreError::UnknownSchool(selection.school));
    }

    let school_scores = table.school_scores(
        &selection.school,
        &selection.year,
        selection.level,
        &selection.exam,
    );
    let school = bin(&school_scores, spec);
    school.require_population()?;

    let country_scores = table.country_scores(&selection.year, &selection.exam);
    let country = bin(&country_scores, spec);
    if country.is_empty_population() {
        warn!(
            year = %selection.year,
            exam = %selection.exam,
            "No country results for the selected exam"
        );
    }

    info!(
        school = %selection.school,
        exam = %selection.exam,
        school_participants = school_scores.len(),
        country_participants = country_scores.len(),
        "Exam report built"
    );

    Ok(ExamReport {
        generated_at: Utc::now(),
        address: table.address(&selection.school).map(str::to_string),
        school_summary: PopulationSummary::from_scores(&school_scores, spec),
        country_summary: PopulationSummary::from_scores(&country_scores, spec),
        school,
        country,
        selection,
    })
}
