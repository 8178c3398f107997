// crates/delivery-stats-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Can't find input file {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input is not line-delimited JSON (line {line}): {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid {filter} pattern: {source}")]
    InvalidPattern {
        filter: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Data processing error: {0}")]
    Processing(String),
}

/// Problems with the shape of otherwise well-formed JSON records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Can't find all the relevant fields to work with; missing: {}", missing.join(", "))]
    MissingFields { missing: Vec<&'static str> },

    #[error("record {record} has an invalid timestamp: {value}")]
    InvalidTimestamp { record: usize, value: String },

    #[error("record {record} has a non-numeric duration: {value}")]
    InvalidDuration { record: usize, value: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
