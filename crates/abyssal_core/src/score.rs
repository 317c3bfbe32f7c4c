//! Mining score.
//!
//! Every number here is a pure function of one joined cell and the
//! [`ScoreWeights`]; nothing is normalised across cells.

use crate::config::ScoreWeights;
use crate::error::{ScoreError, ScoreInput};
use abyssal_data::{JoinedCell, MergedCellRecord};

/// The three derived fields of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub total_value: f64,
    pub difficulty: f64,
    pub score: f64,
}

/// Sum of abundance × unit value over the cell's resources.
#[must_use]
pub fn total_value(cell: &JoinedCell) -> f64 {
    cell.resources.iter().map(|r| r.value()).sum()
}

/// Extraction difficulty. Increases with depth, pressure and summed hazard
/// severity and never drops below `weights.difficulty_floor`.
#[must_use]
pub fn difficulty(depth: f64, pressure: f64, hazard_severity: f64, weights: &ScoreWeights) -> f64 {
    let raw = weights.base_difficulty
        + weights.depth_weight * depth / weights.depth_scale
        + weights.pressure_weight * pressure / weights.pressure_scale
        + weights.hazard_weight * hazard_severity;
    raw.max(weights.difficulty_floor)
}

fn required(value: Option<f64>, cell: &JoinedCell, input: ScoreInput) -> Result<f64, ScoreError> {
    value
        .filter(|v| !v.is_nan())
        .ok_or(ScoreError::MissingInput {
            key: cell.key(),
            input,
        })
}

/// Scores one cell. Fails if depth or pressure is missing.
pub fn score_cell(cell: &JoinedCell, weights: &ScoreWeights) -> Result<ScoreBreakdown, ScoreError> {
    let depth = required(cell.cell.depth, cell, ScoreInput::Depth)?;
    let pressure = required(cell.cell.pressure, cell, ScoreInput::Pressure)?;

    let total_value = total_value(cell);
    let difficulty = difficulty(depth, pressure, cell.hazard_severity(), weights);
    let penalty = weights.ecological_weight * cell.threatened_life() as f64;
    let score = (weights.value_weight * total_value / difficulty - penalty).max(0.0);

    Ok(ScoreBreakdown {
        total_value,
        difficulty,
        score,
    })
}

/// Scores every cell, stopping at the first cell that cannot be scored.
pub fn score_all(
    cells: Vec<JoinedCell>,
    weights: &ScoreWeights,
) -> Result<Vec<MergedCellRecord>, ScoreError> {
    cells
        .into_iter()
        .map(|cell| {
            let breakdown = score_cell(&cell, weights)?;
            Ok(MergedCellRecord {
                cell,
                total_value: breakdown.total_value,
                difficulty: breakdown.difficulty,
                score: breakdown.score,
            })
        })
        .collect()
}
