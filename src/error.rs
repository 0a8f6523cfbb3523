//! Typed failures for the scan pipeline.
//!
//! `ParseError` is line-level, `FileRejection` is the file-level verdict the
//! aggregator records in the error log, and `ScanError` aborts a scan.

use std::path::PathBuf;
use thiserror::Error;

/// A result line that does not match `[OPERATION], EVENT, VALUE`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected 3 comma-separated fields, found {found}")]
    MissingFields { found: usize },

    #[error("value {value:?} is not a number")]
    BadValue { value: String },
}

/// Why a result file was left out of the instance table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FileRejection {
    #[error("expected {expected} data rows, found {found}")]
    RowCount { found: usize, expected: usize },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("metric {0:?} appears more than once")]
    DuplicateMetric(String),

    #[error("metric set differs from schema (missing {missing:?}, unexpected {unexpected:?})")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("cannot read file: {0}")]
    Unreadable(String),
}

/// Fatal scan failures.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan target {0} does not exist or is not a directory")]
    MissingDirectory(PathBuf),

    #[error("list directory {path}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
