//! Exam display names.
//!
//! The export switched naming conventions in the 2022 school year. Before
//! that, untitled rows carried a prefixed lowercase subject
//! (`"Centralizētais eksāmens matemātika"`); from 2022 the subject column
//! holds the display name directly. [`CONVENTIONS`] is the single place that
//! boundary is recorded.
//!
//! Legacy names only get their first letter upper-cased; the rest keeps the
//! export's casing, so `"angļu Valoda"` becomes `"Angļu Valoda"`.

use crate::exams::record::ExamRecord;

/// Title value meaning "no canonical title".
pub const NOT_AVAILABLE: &str = "N/D";

/// Prefix carried by subject names under [`NamingConvention::PrefixedSubject`].
pub const LEGACY_SUBJECT_PREFIX: &str = "Centralizētais eksāmens ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// Strip [`LEGACY_SUBJECT_PREFIX`] and capitalize the remainder.
    PrefixedSubject,
    /// Use the subject as-is.
    PlainSubject,
}

/// First school year each convention applies to, ascending.
static CONVENTIONS: &[(i32, NamingConvention)] = &[
    (i32::MIN, NamingConvention::PrefixedSubject),
    (2022, NamingConvention::PlainSubject),
];

/// Convention in force for `year`. Years that do not parse count as legacy.
pub fn convention_for(year: Option<i32>) -> NamingConvention {
    let year = year.unwrap_or(0);
    CONVENTIONS
        .iter()
        .rev()
        .find(|(from, _)| year >= *from)
        .map(|(_, convention)| *convention)
        .unwrap_or(NamingConvention::PrefixedSubject)
}

/// Display name of the exam a row belongs to.
///
/// Returns the title when it holds a real value, otherwise a name derived
/// from the subject. `None` only when there is neither a title nor a
/// subject.
pub fn resolve(record: &ExamRecord) -> Option<String> {
    resolve_fields(
        record.exam_title.as_deref(),
        record.year(),
        record.subject.as_deref(),
    )
}

pub fn resolve_fields(title: Option<&str>, year: Option<i32>, subject: Option<&str>) -> Option<String> {
    if let Some(title) = title.filter(|t| has_title(t)) {
        return Some(title.to_string());
    }

    let subject = subject?;
    let name = match convention_for(year) {
        NamingConvention::PrefixedSubject => {
            capitalize_first(subject.strip_prefix(LEGACY_SUBJECT_PREFIX).unwrap_or(subject))
        }
        NamingConvention::PlainSubject => subject.to_string(),
    };
    Some(name)
}

fn has_title(title: &str) -> bool {
    let title = title.trim();
    !title.is_empty() && title != NOT_AVAILABLE
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
