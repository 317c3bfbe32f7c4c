//! Batch merge of the abyssal survey tables into one scored record per
//! grid cell.
//!
//! The heavy lifting lives in the workspace crates; this library wires them
//! into a complete run and renders summaries for the binaries.

pub mod pipeline;
pub mod summary;

pub use pipeline::{run, RunSummary};
pub use summary::{render_markdown, write_markdown, GridStats};
