//! Error types for the listing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, aggregating or exporting listings.
#[derive(Debug, Error)]
pub enum RaterError {
    /// The source table could not be opened or read as delimited text.
    #[error("failed to load listings from {path}: {source}")]
    DataLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required semantic field has no matching column in the header.
    #[error("missing required column `{column}` for field {field}")]
    Schema {
        field: &'static str,
        column: String,
    },

    /// A numeric column holds text that is not a finite number.
    #[error("line {line}: column `{column}` has non-numeric value {value:?}")]
    MalformedValue {
        line: u64,
        column: String,
        value: String,
    },

    /// The column mapping file is unreadable or not valid JSON.
    #[error("invalid column mapping {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Writing an export file failed.
    #[error("failed to export to {path}: {message}")]
    Export { path: PathBuf, message: String },

    /// The requested borough has no neighbourhoods in the aggregate table.
    #[error("unknown borough {0:?}")]
    UnknownBorough(String),
}

pub type Result<T> = std::result::Result<T, RaterError>;
