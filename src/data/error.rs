use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading positions from a source. None are recovered.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot open {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV in {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid parquet in {}: {reason}", path.display())]
    Parquet { path: PathBuf, reason: String },

    #[error("expected a top-level JSON array in {}", .0.display())]
    NotAnArray(PathBuf),

    #[error("row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("invalid axis selector '{0}', expected one of all, x, y, z")]
    InvalidAxis(String),
}

impl ReadError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        ReadError::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}
