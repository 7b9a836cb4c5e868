//! Output formatting and persistence for the produced tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use std::fmt::Debug;
use std::fs::{self, File};
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, replacing any existing file.
///
/// Parent directories are created as needed. The header row comes from the
/// row type's field names.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    debug!(path, rows = rows.len(), "Writing CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
