use serde::{Deserialize, Serialize};

/// Exam-type tag of rows that carry centrally graded results.
pub const CENTRALIZED_EXAM: &str = "Centralizēts eksāmens";

/// One student result from the export, after load-boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub institution: String,
    /// School year as written in the export, e.g. `"2021"`.
    pub school_year: String,
    pub exam_type: String,
    /// Numeric grade level; `None` when the column is not a number.
    pub grade_level: Option<f64>,
    pub subject: Option<String>,
    /// Canonical exam title, or the `"N/D"` sentinel.
    pub exam_title: Option<String>,
    pub score: f64,
    pub address: Option<String>,
}

impl ExamRecord {
    /// School year as an integer, if it parses as one.
    pub fn year(&self) -> Option<i32> {
        self.school_year.trim().parse().ok()
    }

    pub fn is_centralized(&self) -> bool {
        self.exam_type.trim() == CENTRALIZED_EXAM
    }
}

/// Education level used to narrow results by grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolLevel {
    /// Grades 1 through 9 (pamatskola).
    Basic,
    /// Grades 10 through 12 (vidusskola).
    Secondary,
}

impl SchoolLevel {
    pub fn grade_range(self) -> (f64, f64) {
        match self {
            SchoolLevel::Basic => (1.0, 9.0),
            SchoolLevel::Secondary => (10.0, 12.0),
        }
    }

    /// Inclusive grade check; rows without a numeric grade never match.
    pub fn contains(self, grade_level: Option<f64>) -> bool {
        let (lo, hi) = self.grade_range();
        grade_level.is_some_and(|g| (lo..=hi).contains(&g))
    }

    pub fn label(self) -> &'static str {
        match self {
            SchoolLevel::Basic => "Pamatskola",
            SchoolLevel::Secondary => "Vidusskola",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: &str, exam_type: &str) -> ExamRecord {
        ExamRecord {
            institution: "Test".to_string(),
            school_year: year.to_string(),
            exam_type: exam_type.to_string(),
            grade_level: Some(12.0),
            subject: None,
            exam_title: None,
            score: 50.0,
            address: None,
        }
    }

    #[test]
    fn test_year_parses_integer_only() {
        assert_eq!(record("2021", CENTRALIZED_EXAM).year(), Some(2021));
        assert_eq!(record("2021/2022", CENTRALIZED_EXAM).year(), None);
    }

    #[test]
    fn test_is_centralized_ignores_padding() {
        assert!(record("2021", " Centralizēts eksāmens ").is_centralized());
        assert!(!record("2021", "Diagnosticējošais darbs").is_centralized());
    }

    #[test]
    fn test_level_boundaries() {
        assert!(SchoolLevel::Basic.contains(Some(1.0)));
        assert!(SchoolLevel::Basic.contains(Some(9.0)));
        assert!(!SchoolLevel::Basic.contains(Some(10.0)));
        assert!(SchoolLevel::Secondary.contains(Some(10.0)));
        assert!(SchoolLevel::Secondary.contains(Some(12.0)));
        assert!(!SchoolLevel::Secondary.contains(Some(13.0)));
        assert!(!SchoolLevel::Secondary.contains(None));
    }
}
