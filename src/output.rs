//! Output formatting and persistence for the aggregate table.
//!
//! Supports pretty-printing, JSON reports and CSV export.

use crate::analyzers::types::{BoroughSummary, NeighbourhoodAggregate, RankingReport};
use crate::error::{RaterError, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| RaterError::Export {
        path: "<log>".into(),
        message: e.to_string(),
    })?;
    info!("{}", json);
    Ok(())
}

/// Writes rows as CSV with a header row naming the grouping keys and every
/// computed field.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> csv::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports ranked neighbourhood rows to a CSV file at `path`.
pub fn export_rankings(path: &Path, rows: &[&NeighbourhoodAggregate]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Exporting rankings");
    write_file(path, |file| write_csv(file, rows).map_err(|e| e.to_string()))
}

/// Exports per-borough summaries to a CSV file at `path`.
pub fn export_borough_summary(path: &Path, rows: &[BoroughSummary]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Exporting borough summary");
    write_file(path, |file| write_csv(file, rows).map_err(|e| e.to_string()))
}

/// Writes a [`RankingReport`] as pretty-printed JSON to `path`.
pub fn export_report(path: &Path, report: &RankingReport) -> Result<()> {
    debug!(path = %path.display(), "Exporting JSON report");
    write_file(path, |file| {
        serde_json::to_writer_pretty(file, report).map_err(|e| e.to_string())
    })
}

fn write_file(
    path: &Path,
    write: impl FnOnce(File) -> std::result::Result<(), String>,
) -> Result<()> {
    let export_err = |message: String| RaterError::Export {
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
    write(file).map_err(export_err)
}
