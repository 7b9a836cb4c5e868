//! Environment-driven defaults for the CLI.
//!
//! `.env` is loaded by the binary before [`Settings::from_env`] runs, so
//! values there behave like ordinary environment variables.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_CATALOG_PATH: &str = "data/schools.json";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "exam_dashboard";
pub const DEFAULT_GEOCODE_DELAY_MS: u64 = 1000;
pub const DEFAULT_LOG_FILE: &str = "logs/school_stats.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// CSV path or URL of the exam export (`EXAM_DATA_SOURCE`).
    pub exam_source: Option<String>,
    pub catalog_path: String,
    pub nominatim_url: String,
    pub user_agent: String,
    pub geocode_min_delay: Duration,
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exam_source: None,
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocode_min_delay: Duration::from_millis(DEFAULT_GEOCODE_DELAY_MS),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; unset keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let geocode_min_delay = match get("GEOCODE_MIN_DELAY_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "GEOCODE_MIN_DELAY_MS is not a number, using default");
                    defaults.geocode_min_delay
                }
            },
            None => defaults.geocode_min_delay,
        };

        Self {
            exam_source: get("EXAM_DATA_SOURCE"),
            catalog_path: get("SCHOOL_CATALOG_PATH").unwrap_or(defaults.catalog_path),
            nominatim_url: get("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            user_agent: get("NOMINATIM_USER_AGENT").unwrap_or(defaults.user_agent),
            geocode_min_delay,
            log_file: get("LOG_FILE_PATH").unwrap_or(defaults.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        assert_eq!(Settings::from_lookup(lookup(&[])), Settings::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup(&[
            ("EXAM_DATA_SOURCE", "https://example.org/export.csv"),
            ("SCHOOL_CATALOG_PATH", "/srv/schools.json"),
            ("GEOCODE_MIN_DELAY_MS", "250"),
        ]));

        assert_eq!(settings.exam_source.as_deref(), Some("https://example.org/export.csv"));
        assert_eq!(settings.catalog_path, "/srv/schools.json");
        assert_eq!(settings.geocode_min_delay, Duration::from_millis(250));
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let settings = Settings::from_lookup(lookup(&[
            ("EXAM_DATA_SOURCE", "  "),
            ("GEOCODE_MIN_DELAY_MS", "soon"),
        ]));

        assert_eq!(settings.exam_source, None);
        assert_eq!(
            settings.geocode_min_delay,
            Duration::from_millis(DEFAULT_GEOCODE_DELAY_MS)
        );
    }
}
