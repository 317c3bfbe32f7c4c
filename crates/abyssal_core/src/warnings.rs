//! Non-fatal conditions collected during a run.

use abyssal_data::{Biome, CellKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every condition the pipeline recovers from instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A side-table row points at a cell the base table does not have.
    OrphanReference {
        source: String,
        line: usize,
        row: u32,
        col: u32,
    },
    /// A food-web link names a biome no cell belongs to.
    OrphanBiome {
        source: String,
        line: usize,
        biome: Biome,
    },
    /// A single-valued table had more than one row for a cell; the later
    /// row replaced the earlier one.
    DuplicateSingular {
        source: String,
        line: usize,
        row: u32,
        col: u32,
    },
    /// A side table was not configured and contributed nothing.
    SourceSkipped { source: String },
}

impl Warning {
    #[must_use]
    pub fn orphan(source: &str, line: usize, key: CellKey) -> Self {
        Self::OrphanReference {
            source: source.to_string(),
            line,
            row: key.row,
            col: key.col,
        }
    }

    #[must_use]
    pub fn duplicate(source: &str, line: usize, key: CellKey) -> Self {
        Self::DuplicateSingular {
            source: source.to_string(),
            line,
            row: key.row,
            col: key.col,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanReference {
                source,
                line,
                row,
                col,
            } => write!(f, "{source}:{line}: unknown cell ({row}, {col}), row dropped"),
            Self::OrphanBiome {
                source,
                line,
                biome,
            } => write!(f, "{source}:{line}: no cell has biome {biome}, link dropped"),
            Self::DuplicateSingular {
                source,
                line,
                row,
                col,
            } => write!(
                f,
                "{source}:{line}: duplicate row for cell ({row}, {col}), replaces earlier row"
            ),
            Self::SourceSkipped { source } => write!(f, "{source}: not configured, skipped"),
        }
    }
}

/// Ordered collection of warnings; every push is also logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.0.push(warning);
    }

    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.0.iter()
    }

    /// Rows dropped because their cell or biome does not exist.
    #[must_use]
    pub fn count_orphans(&self) -> usize {
        self.0
            .iter()
            .filter(|w| {
                matches!(
                    w,
                    Warning::OrphanReference { .. } | Warning::OrphanBiome { .. }
                )
            })
            .count()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}
