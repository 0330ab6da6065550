use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Typed errors for the data layer
// ---------------------------------------------------------------------------

/// Failure while loading a dataset. Fatal for the attempted session: without
/// a dataset there is nothing to show, so the message carries enough detail
/// to locate the bad file, row, or column.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed {format} input: {message}")]
    Format { format: &'static str, message: String },

    #[error("row {row}, column '{column}': {message}")]
    BadValue {
        /// 1-based over data rows: row 1 is the first row after any header.
        row: usize,
        column: &'static str,
        message: String,
    },
}

impl LoadError {
    pub fn bad_value(row: usize, column: &'static str, message: impl Into<String>) -> Self {
        LoadError::BadValue {
            row,
            column,
            message: message.into(),
        }
    }
}

/// Failure while serializing a filtered view to CSV. Recoverable: the export
/// is simply unavailable for that request.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}
