//! # Abyssal IO
//!
//! File boundary of the merge pipeline.
//!
//! This crate provides:
//! - CSV table loading (plain or gzip) with typed, validated decoding
//! - Parallel loading of every configured source table
//! - The merged CSV artifact: writer and round-trip reader
//! - JSON export and the per-run report

/// Error types and result aliases for I/O operations
pub mod error;
/// Merged artifact encoding, atomic writing and decoding
pub mod export;
/// Run report with fingerprint, warnings and stage timings
pub mod report;
/// JSON helpers
pub mod serialization;
/// Loading every configured source into a `SourceSet`
pub mod sources;
/// Raw CSV tables and typed record decoding
pub mod table;
/// Load-time record validation
pub mod validate;

pub use error::{ExportError, LoadError, Result};
pub use export::{
    encode_record, load_merged, read_merged, stage_merged, write_merged, StagedArtifact,
    MERGED_COLUMNS,
};
pub use report::RunReport;
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, write_json_file};
pub use sources::{load_sources, source_path};
pub use table::{Table, TableRow};
pub use validate::Validate;
