//! In-memory exam export and the filter queries over it.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::CoreError;
use crate::exams::record::{ExamRecord, SchoolLevel};
use crate::exams::resolver::resolve;

/// Loaded export rows plus the rows that were rejected while loading.
#[derive(Debug, Clone, Default)]
pub struct ExamTable {
    pub records: Vec<ExamRecord>,
    /// One [`CoreError::MalformedRow`] per rejected row.
    pub skipped: Vec<CoreError>,
}

impl ExamTable {
    pub fn new(records: Vec<ExamRecord>) -> Self {
        Self {
            records,
            skipped: Vec::new(),
        }
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keeps only centrally graded rows. Rejected-row signals are kept.
    pub fn centralized(self) -> Self {
        let before = self.records.len();
        let records: Vec<ExamRecord> = self
            .records
            .into_iter()
            .filter(ExamRecord::is_centralized)
            .collect();
        debug!(before, after = records.len(), "Filtered to centralized exams");

        Self {
            records,
            skipped: self.skipped,
        }
    }

    /// Distinct institution names, sorted.
    pub fn schools(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.institution.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct school years for `school`, oldest first.
    pub fn years(&self, school: &str) -> Vec<&str> {
        let mut years: Vec<&ExamRecord> = self.for_school(school).collect();
        years.sort_by(|a, b| {
            (a.year(), a.school_year.as_str()).cmp(&(b.year(), b.school_year.as_str()))
        });
        let mut out: Vec<&str> = years.into_iter().map(|r| r.school_year.as_str()).collect();
        out.dedup();
        out
    }

    /// Most recent school year for `school`; the default selection.
    pub fn latest_year(&self, school: &str) -> Option<&str> {
        self.years(school).last().copied()
    }

    /// Distinct resolved exam names for a school, year and level, sorted.
    pub fn exams(&self, school: &str, year: &str, level: SchoolLevel) -> Vec<String> {
        self.for_school_year_level(school, year, level)
            .filter_map(resolve)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Address from the school's first row.
    pub fn address(&self, school: &str) -> Option<&str> {
        self.for_school(school).next().and_then(|r| r.address.as_deref())
    }

    /// Scores of one school for a resolved exam name.
    pub fn school_scores(&self, school: &str, year: &str, level: SchoolLevel, exam: &str) -> Vec<f64> {
        self.for_school_year_level(school, year, level)
            .filter(|r| resolve(r).as_deref() == Some(exam))
            .map(|r| r.score)
            .collect()
    }

    /// Scores of every school for a resolved exam name in `year`, all grade
    /// levels included.
    pub fn country_scores(&self, year: &str, exam: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.school_year == year)
            .filter(|r| resolve(r).as_deref() == Some(exam))
            .map(|r| r.score)
            .collect()
    }

    fn for_school<'a>(&'a self, school: &str) -> impl Iterator<Item = &'a ExamRecord> {
        self.records.iter().filter(move |r| r.institution == school)
    }

    fn for_school_year_level<'a>(
        &'a self,
        school: &str,
        year: &str,
        level: SchoolLevel,
    ) -> impl Iterator<Item = &'a ExamRecord> {
        self.for_school(school)
            .filter(move |r| r.school_year == year && level.contains(r.grade_level))
    }
}
