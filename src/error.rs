//! Error values produced by the core transforms and the load boundary.

use thiserror::Error;

/// Failures surfaced by the catalog, series, binning and ingestion code.
///
/// None of these terminate the process; callers decide whether to show a
/// notice, substitute a default, or abort.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A year present in the school series has no counterpart in the
    /// country series.
    #[error("year {year} has no matching reference value")]
    MissingReferenceYear { year: i32 },

    #[error("cannot bin an empty population")]
    EmptyPopulation,

    /// A tabular row lacked a field required for resolution or binning.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("year key '{0}' is not an integer")]
    InvalidYear(String),

    #[error("invalid bin layout: width {width} over [0, {max})")]
    InvalidBinning { width: f64, max: f64 },

    #[error("unknown school '{0}'")]
    UnknownSchool(String),

    #[error("school '{0}' appears more than once in the catalog")]
    DuplicateSchool(String),

    #[error("{field} value {value} is outside [0, 100]")]
    ValueOutOfRange { field: String, value: f64 },
}

/// Parses a sparse year key (`"2021"`) into an integer year.
pub fn parse_year(key: &str) -> Result<i32, CoreError> {
    key.trim()
        .parse::<i32>()
        .map_err(|_| CoreError::InvalidYear(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_accepts_padded_integer() {
        assert_eq!(parse_year(" 2021 "), Ok(2021));
    }

    #[test]
    fn test_parse_year_rejects_text() {
        assert_eq!(
            parse_year("2021/2022"),
            Err(CoreError::InvalidYear("2021/2022".to_string()))
        );
    }

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = CoreError::MissingReferenceYear { year: 2011 };
        assert_eq!(err.to_string(), "year 2011 has no matching reference value");

        let err = CoreError::MalformedRow {
            line: 7,
            reason: "missing Procenti".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
    }
}
