//! Aggregate → join → score over an already loaded [`SourceSet`].

use crate::aggregate::aggregate;
use crate::config::AppConfig;
use crate::error::Result;
use crate::join::{join, CellIndex};
use crate::metrics::RunMetrics;
use crate::score::score_all;
use crate::sources::SourceSet;
use crate::warnings::Warnings;
use abyssal_data::MergedCellRecord;

/// Everything a successful merge produces.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// One record per base cell, in base order.
    pub records: Vec<MergedCellRecord>,
    pub warnings: Warnings,
    pub metrics: RunMetrics,
}

/// Merges and scores `sources`. Fatal errors abort before any record is
/// returned.
pub fn merge(sources: &SourceSet, config: &AppConfig) -> Result<MergeOutcome> {
    let mut metrics = RunMetrics::new();
    let mut warnings = Warnings::new();

    let index = metrics.time("index", || {
        let index = CellIndex::build(&sources.cells, config.pipeline.require_dense_grid);
        let rows = index.as_ref().map_or(0, CellIndex::len);
        (index, rows)
    })?;

    let aggregates = metrics.time("aggregate", || {
        let side_rows: usize = sources.row_counts().iter().skip(1).map(|(_, n)| n).sum();
        (aggregate(&index, sources, &mut warnings), side_rows)
    });

    let joined = metrics.time("join", || {
        let joined = join(&index, &sources.cells, aggregates);
        let rows = joined.len();
        (joined, rows)
    });
    debug_assert_eq!(joined.len(), index.len());

    let records = metrics.time("score", || {
        let scored = score_all(joined, &config.score);
        let rows = scored.as_ref().map_or(0, Vec::len);
        (scored, rows)
    })?;

    tracing::info!(
        cells = records.len(),
        warnings = warnings.len(),
        orphans = warnings.count_orphans(),
        "Merge complete"
    );

    Ok(MergeOutcome {
        records,
        warnings,
        metrics,
    })
}
