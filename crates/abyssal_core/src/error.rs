//! Fatal error types of the merge stages.
//!
//! Anything here aborts the run before an artifact is written; recoverable
//! conditions live in [`crate::warnings`].

use abyssal_data::CellKey;
use thiserror::Error;

/// The base cell table cannot serve as a join spine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("cell table {source_name} is empty")]
    EmptyGrid { source_name: String },

    #[error("cell {key} appears twice in {source_name} (lines {first_line} and {line})")]
    DuplicateCell {
        source_name: String,
        key: CellKey,
        first_line: usize,
        line: usize,
    },

    #[error(
        "grid is not dense: expected {expected} cells for {rows}x{cols}, found {found} (first missing {first_missing})"
    )]
    IncompleteGrid {
        rows: u32,
        cols: u32,
        expected: usize,
        found: usize,
        first_missing: CellKey,
    },
}

/// Names the physical input a cell was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreInput {
    Depth,
    Pressure,
}

impl std::fmt::Display for ScoreInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Depth => "depth",
            Self::Pressure => "pressure",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("cell {key} has no {input}; refusing to score it")]
    MissingInput { key: CellKey, input: ScoreInput },
}

/// Any fatal failure between loading and export.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Result type alias for merge stages.
pub type Result<T> = std::result::Result<T, PipelineError>;
