//! Tidy tables behind the three dashboard tabs: general information,
//! student wellbeing and exam results.

use rand::Rng;
use serde::Serialize;

use crate::analyzers::jitter::{JitterConfig, jitter_series};
use crate::analyzers::series::{MissingReferencePolicy, build_series};
use crate::analyzers::types::{Category, ComparisonPoint};
use crate::catalog::{Comparison, Coordinates, ExamResults, School, Staff};
use crate::error::{CoreError, parse_year};

/// Static facts shown on the general information tab.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolFacts {
    pub name: String,
    pub sector: String,
    pub school_type: String,
    pub grade_range: String,
    pub address: String,
    pub website: Option<String>,
    pub coordinates: Coordinates,
    pub teachers: Staff,
    pub administration: Staff,
}

impl SchoolFacts {
    pub fn from_school(school: &School) -> Self {
        Self {
            name: school.name.clone(),
            sector: school.sector.clone(),
            school_type: school.school_type.clone(),
            grade_range: school.grade_range.clone(),
            address: school.address.clone(),
            website: school.website.clone(),
            coordinates: school.coordinates,
            teachers: school.teachers.clone(),
            administration: school.administration.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boys,
    Girls,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRow {
    pub year: i32,
    pub gender: Gender,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileRow {
    pub quartile: String,
    pub category: Category,
    pub value: f64,
    pub label: String,
}

/// Enrollment per year and gender, ordered by year.
pub fn enrollment_rows(school: &School) -> Result<Vec<EnrollmentRow>, CoreError> {
    let mut rows = Vec::with_capacity(school.enrollment.len() * 2);
    for (key, enrollment) in &school.enrollment {
        let year = parse_year(key)?;
        rows.push(EnrollmentRow {
            year,
            gender: Gender::Boys,
            count: enrollment.boys,
        });
        rows.push(EnrollmentRow {
            year,
            gender: Gender::Girls,
            count: enrollment.girls,
        });
    }
    rows.sort_by_key(|r| (r.year, r.gender));
    Ok(rows)
}

/// Attendance percentage per year, ordered by year.
pub fn attendance_rows(school: &School) -> Result<Vec<YearValue>, CoreError> {
    let mut rows = school
        .attendance
        .iter()
        .map(|(key, value)| {
            Ok(YearValue {
                year: parse_year(key)?,
                value: *value,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;
    rows.sort_by_key(|r| r.year);
    Ok(rows)
}

/// Satisfaction, school against country. Shown as-is, without jitter.
pub fn satisfaction_series(
    school: &School,
    policy: MissingReferencePolicy,
) -> Result<Vec<ComparisonPoint>, CoreError> {
    let subject = school.satisfaction.school.clone().unwrap_or_default();
    build_series(&subject, &school.satisfaction.country, policy)
}

/// Quartile shares with a `"NN%"` label; school rows come first.
pub fn quartile_rows(school: &School) -> Vec<QuartileRow> {
    let sides = [
        (Category::Subject, &school.quartiles.school),
        (Category::Reference, &school.quartiles.country),
    ];

    sides
        .into_iter()
        .flat_map(|(category, shares)| {
            shares.iter().map(move |(quartile, value)| QuartileRow {
                quartile: quartile.clone(),
                category,
                value: *value,
                label: format!("{value}%"),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamKind {
    /// Centralized state exams (grades 9 and 12).
    State,
    /// Diagnostic tests (grades 3 and 6).
    Diagnostic,
}

impl ExamKind {
    fn results(self, school: &School) -> &ExamResults {
        match self {
            ExamKind::State => &school.state_exams,
            ExamKind::Diagnostic => &school.diagnostic_exams,
        }
    }
}

/// Grades with results of `kind`, lowest grade first.
pub fn exam_grades(school: &School, kind: ExamKind) -> Vec<&str> {
    let mut grades: Vec<&str> = kind.results(school).keys().map(String::as_str).collect();
    grades.sort_by_key(|label| (grade_number(label).unwrap_or(u32::MAX), *label));
    grades
}

/// Leading number of a grade label such as `"9. klase"`.
fn grade_number(label: &str) -> Option<u32> {
    let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Subjects examined in `grade`; empty if the grade is unknown.
pub fn exam_subjects<'a>(school: &'a School, kind: ExamKind, grade: &str) -> Vec<&'a str> {
    kind.results(school)
        .get(grade)
        .map(|subjects| subjects.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Result of asking for one exam comparison chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ExamView {
    /// Display-ready series, jitter already applied.
    Series(Vec<ComparisonPoint>),
    /// The school has no results for this exam.
    Unavailable,
}

/// Builds the display series for one (kind, grade, subject) exam.
///
/// Near-identical yearly values are separated with `jitter` using `rng`.
pub fn exam_view<R: Rng + ?Sized>(
    school: &School,
    kind: ExamKind,
    grade: &str,
    subject: &str,
    policy: MissingReferencePolicy,
    jitter: &JitterConfig,
    rng: &mut R,
) -> Result<ExamView, CoreError> {
    let Some(comparison) = kind
        .results(school)
        .get(grade)
        .and_then(|subjects| subjects.get(subject))
    else {
        return Ok(ExamView::Unavailable);
    };

    if !has_school_values(comparison) {
        return Ok(ExamView::Unavailable);
    }

    let subject_series = comparison.school.clone().unwrap_or_default();
    let mut points = build_series(&subject_series, &comparison.country, policy)?;
    jitter_series(&mut points, jitter, rng);

    Ok(ExamView::Series(points))
}

fn has_school_values(comparison: &Comparison) -> bool {
    comparison
        .school
        .as_ref()
        .is_some_and(|series| series.values().any(Option::is_some))
}
