//! Typed per-school dataset for the dashboard.
//!
//! [`SchoolCatalog`] is loaded from a JSON document and validated once at
//! the load boundary, so views never have to deal with malformed year keys
//! or out-of-range percentages.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzers::series::YearSeries;
use crate::error::{CoreError, parse_year};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Headcount and full-time equivalent for a staff group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub headcount: u32,
    pub full_time_equivalent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub boys: u32,
    pub girls: u32,
}

/// School series next to the national average series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub school: Option<YearSeries>,
    #[serde(default)]
    pub country: YearSeries,
}

/// Socio-economic quartile shares (`Q1`..`Q4`) for school and country.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quartiles {
    pub school: BTreeMap<String, f64>,
    pub country: BTreeMap<String, f64>,
}

/// Grade label (`"9. klase"`) to subject to comparison.
pub type ExamResults = BTreeMap<String, BTreeMap<String, Comparison>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    pub sector: String,
    pub school_type: String,
    pub grade_range: String,
    pub address: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub website: Option<String>,
    pub teachers: Staff,
    pub administration: Staff,
    #[serde(default)]
    pub enrollment: BTreeMap<String, Enrollment>,
    #[serde(default)]
    pub quartiles: Quartiles,
    #[serde(default)]
    pub attendance: YearSeries,
    #[serde(default)]
    pub satisfaction: Comparison,
    #[serde(default)]
    pub state_exams: ExamResults,
    #[serde(default)]
    pub diagnostic_exams: ExamResults,
}

#[derive(Deserialize)]
struct CatalogFile {
    schools: Vec<School>,
}

/// All schools, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchoolCatalog {
    schools: BTreeMap<String, School>,
}

impl SchoolCatalog {
    /// Loads and validates the catalog from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read school catalog '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("Invalid school catalog '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Ok(Self::from_schools(file.schools)?)
    }

    /// Builds a catalog after validating every school.
    ///
    /// # Errors
    ///
    /// Fails on non-integer year keys, percentages outside `[0, 100]`, or
    /// duplicate school names.
    pub fn from_schools(schools: Vec<School>) -> Result<Self, CoreError> {
        let mut by_name = BTreeMap::new();

        for school in schools {
            validate_school(&school)?;
            if by_name.contains_key(&school.name) {
                return Err(CoreError::DuplicateSchool(school.name));
            }
            by_name.insert(school.name.clone(), school);
        }

        debug!(schools = by_name.len(), "School catalog loaded");
        Ok(Self { schools: by_name })
    }

    pub fn get(&self, name: &str) -> Option<&School> {
        self.schools.get(name)
    }

    /// Like [`get`](Self::get) but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<&School, CoreError> {
        self.get(name)
            .ok_or_else(|| CoreError::UnknownSchool(name.to_string()))
    }

    /// School names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

fn validate_school(school: &School) -> Result<(), CoreError> {
    for year in school.enrollment.keys() {
        parse_year(year)?;
    }

    validate_series(&format!("{} attendance", school.name), &school.attendance)?;
    validate_comparison(&format!("{} satisfaction", school.name), &school.satisfaction)?;

    for (kind, exams) in [("state", &school.state_exams), ("diagnostic", &school.diagnostic_exams)] {
        for (grade, subjects) in exams {
            for (subject, comparison) in subjects {
                let field = format!("{} {kind} {grade} {subject}", school.name);
                validate_comparison(&field, comparison)?;
            }
        }
    }

    for (side, shares) in [("school", &school.quartiles.school), ("country", &school.quartiles.country)] {
        for (quartile, value) in shares {
            check_pct(&format!("{} quartile {side} {quartile}", school.name), *value)?;
        }
        let sum: f64 = shares.values().sum();
        if !shares.is_empty() && (sum - 100.0).abs() > 0.5 {
            warn!(school = %school.name, side, sum, "Quartile shares do not sum to 100");
        }
    }

    Ok(())
}

fn validate_comparison(field: &str, comparison: &Comparison) -> Result<(), CoreError> {
    if let Some(school) = &comparison.school {
        validate_series(field, school)?;
    }
    validate_series(field, &comparison.country)
}

fn validate_series(field: &str, series: &YearSeries) -> Result<(), CoreError> {
    for (year, value) in series {
        parse_year(year)?;
        if let Some(value) = value {
            check_pct(field, *value)?;
        }
    }
    Ok(())
}

fn check_pct(field: &str, value: f64) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::ValueOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}
