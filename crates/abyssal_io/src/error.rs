//! Error types for abyssal_io crate.
//!
//! Provides structured error handling for reading source tables and for
//! writing and re-reading the merged artifact.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A source table could not be turned into typed records. Always fatal.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file is missing or cannot be opened/decompressed.
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A key column the table is joined on is absent from the header.
    #[error("{source_name}: missing required column {column:?}")]
    MissingColumn { source_name: String, column: String },

    /// The CSV structure itself is broken (ragged rows, bad quoting, bad UTF-8).
    #[error("{source_name}:{line}: malformed table: {message}")]
    Malformed {
        source_name: String,
        line: usize,
        message: String,
    },

    /// A row parsed but failed type conversion or validation.
    #[error("{source_name}:{line}: invalid record: {reason}")]
    InvalidRecord {
        source_name: String,
        line: usize,
        reason: String,
    },
}

impl LoadError {
    /// Creates a new malformed-table error.
    #[must_use]
    pub fn malformed<S: Into<String>, M: Into<String>>(source_name: S, line: usize, message: M) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a new invalid-record error.
    #[must_use]
    pub fn invalid<S: Into<String>, R: Into<String>>(source_name: S, line: usize, reason: R) -> Self {
        Self::InvalidRecord {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Converts a csv error, using its position when it carries one.
    ///
    /// I/O failures (including a corrupt gzip stream) become
    /// [`LoadError::Unreadable`]; deserialisation failures become
    /// [`LoadError::InvalidRecord`]; everything else is malformed structure.
    #[must_use]
    pub fn from_csv(source_name: &str, path: &Path, fallback_line: usize, err: csv::Error) -> Self {
        let line = err
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(fallback_line);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::Unreadable {
                path: path.to_path_buf(),
                source,
            },
            csv::ErrorKind::Deserialize { err, .. } => Self::invalid(source_name, line, err.to_string()),
            _ => Self::malformed(source_name, line, message),
        }
    }

    /// Line the failure refers to, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Malformed { line, .. } | Self::InvalidRecord { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Writing or re-reading the merged artifact failed.
#[derive(Error, Debug)]
pub enum ExportError {
    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The artifact could not be loaded as a table
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A column of a merged row could not be decoded
    #[error("line {line}, column {column}: {reason}")]
    Decode {
        line: usize,
        column: String,
        reason: String,
    },

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<ExportError>,
    },
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a new decode error.
    #[must_use]
    pub fn decode<C: Into<String>, R: Into<String>>(line: usize, column: C, reason: R) -> Self {
        Self::Decode {
            line,
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
