//! CSV parser for the exam-results export.

use std::io::Read;

use anyhow::Result;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::exams::{ExamRecord, ExamTable};

/// Row as it appears in the export; every column may be missing.
#[derive(Debug, Deserialize)]
struct RawExamRow {
    #[serde(rename = "Iestādes nosaukums", default)]
    institution: Option<String>,
    #[serde(rename = "Mācību gads", default)]
    school_year: Option<String>,
    #[serde(rename = "Pārbaudījuma tips", default)]
    exam_type: Option<String>,
    #[serde(rename = "Klases pakāpe", default)]
    grade_level: Option<String>,
    #[serde(rename = "Pārbaudījuma mācību priekšmeta nosaukums", default)]
    subject: Option<String>,
    #[serde(rename = "Pārbaudījuma nosaukums", default)]
    exam_title: Option<String>,
    #[serde(rename = "Procenti", default)]
    score: Option<String>,
    #[serde(rename = "Iestādes juridiskās adrese", default)]
    address: Option<String>,
}

impl RawExamRow {
    fn into_record(self) -> Result<ExamRecord, String> {
        let institution = required(self.institution, "Iestādes nosaukums")?;
        let school_year = required(self.school_year, "Mācību gads")?;
        let exam_type = required(self.exam_type, "Pārbaudījuma tips")?;
        let raw_score = required(self.score, "Procenti")?;
        let score = raw_score
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .ok_or_else(|| format!("Procenti '{raw_score}' is not a number"))?;

        Ok(ExamRecord {
            institution,
            school_year,
            exam_type,
            grade_level: self.grade_level.and_then(|g| g.trim().parse().ok()),
            subject: non_empty(self.subject),
            exam_title: non_empty(self.exam_title),
            score,
            address: non_empty(self.address),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, column: &str) -> Result<String, String> {
    non_empty(value).ok_or_else(|| format!("missing {column}"))
}

/// Reads the exam export from `reader`.
///
/// Header names are trimmed. Rows that cannot be turned into an
/// [`ExamRecord`] are reported in [`ExamTable::skipped`] and never silently
/// dropped.
///
/// # Errors
///
/// Returns an error only if the header row cannot be read or the
/// underlying reader fails.
pub fn parse_exam_csv<R: Read>(reader: R) -> Result<ExamTable> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    debug!(columns = headers.len(), "Exam export headers read");

    let mut table = ExamTable::default();

    for result in rdr.records() {
        match result {
            Ok(record) => match parse_row(&record, &headers) {
                Ok(exam) => table.records.push(exam),
                Err(reason) => table.skipped.push(malformed(&record, reason)),
            },
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                table.skipped.push(CoreError::MalformedRow {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !table.skipped.is_empty() {
        warn!(
            skipped = table.skipped.len(),
            loaded = table.records.len(),
            "Skipped malformed exam rows"
        );
    }

    Ok(table)
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<ExamRecord, String> {
    let raw: RawExamRow = record.deserialize(Some(headers)).map_err(|e| e.to_string())?;
    raw.into_record()
}

fn malformed(record: &StringRecord, reason: String) -> CoreError {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    debug!(line, %reason, "Malformed exam row");
    CoreError::MalformedRow { line, reason }
}
