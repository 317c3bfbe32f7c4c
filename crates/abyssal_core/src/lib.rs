//! # Abyssal Core
//!
//! The merge engine for the abyssal survey grid.
//!
//! This crate contains the stateless batch logic that turns a loaded
//! [`SourceSet`] into one scored record per grid cell:
//! - Field normalisation of comma-delimited species and prey lists
//! - Per-cell fan-in and per-biome broadcast aggregation
//! - A left join that keeps every base cell exactly once
//! - The mining score and a deterministic ranking
//! - Configuration, warnings and stage metrics
//!
//! ## Example
//!
//! ```
//! use abyssal_core::{merge, AppConfig, SourceRows, SourceSet};
//! use abyssal_data::{Biome, GridCell};
//!
//! let cell = GridCell {
//!     row: 0,
//!     col: 0,
//!     lat: -10.0,
//!     lon: 150.0,
//!     depth: Some(4000.0),
//!     biome: Biome::Plain,
//!     pressure: Some(400.0),
//!     temperature: Some(1.8),
//! };
//! let sources = SourceSet::with_cells(SourceRows::from_records("cells.csv", vec![cell]));
//! let outcome = merge(&sources, &AppConfig::default()).unwrap();
//! assert_eq!(outcome.records.len(), 1);
//! assert_eq!(outcome.records[0].score, 0.0);
//! ```

/// Grouping of side tables by cell or by biome
pub mod aggregate;
/// Configuration management for pipeline parameters
pub mod config;
/// Fatal error types of the merge stages
pub mod error;
/// Join engine and base-cell index
pub mod join;
/// Stage timings and logging setup
pub mod metrics;
/// Comma-delimited list normalisation
pub mod normalize;
/// Aggregate, join and score in one call
pub mod pipeline;
/// Deterministic best-first ordering of scored cells
pub mod rank;
/// Mining score computation
pub mod score;
/// Typed source tables and their aggregation modes
pub mod sources;
/// Non-fatal conditions collected during a run
pub mod warnings;

pub use config::{AppConfig, ExportConfig, PipelineConfig, ScoreWeights, SourcesConfig};
pub use error::{JoinError, PipelineError, ScoreError, ScoreInput};
pub use metrics::{init_logging, RunMetrics};
pub use normalize::{join_list, normalize_list};
pub use pipeline::{merge, MergeOutcome};
pub use rank::rank_cells;
pub use sources::{AggregationMode, LineRecord, SourceKind, SourceRows, SourceSet};
pub use warnings::{Warning, Warnings};
