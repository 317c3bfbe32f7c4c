//! Deterministic ordering of scored cells for extraction planning.

use abyssal_data::MergedCellRecord;
use std::cmp::Ordering;

/// Best-first comparison: score descending, then total value descending,
/// then `(row, col)` ascending.
#[must_use]
pub fn compare(a: &MergedCellRecord, b: &MergedCellRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.total_value.total_cmp(&a.total_value))
        .then_with(|| a.key().cmp(&b.key()))
}

/// The `limit` best cells. Ties resolve the same way on every run.
#[must_use]
pub fn rank_cells(records: &[MergedCellRecord], limit: usize) -> Vec<&MergedCellRecord> {
    let mut ranked: Vec<&MergedCellRecord> = records.iter().collect();
    ranked.sort_by(|a, b| compare(a, b));
    ranked.truncate(limit);
    ranked
}
