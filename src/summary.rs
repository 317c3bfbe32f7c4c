//! Markdown summary of a merged artifact and, optionally, its run report.

use abyssal_core::rank_cells;
use abyssal_data::{Biome, MergedCellRecord};
use abyssal_io::RunReport;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Aggregate figures over every cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStats {
    pub cells: usize,
    pub rows: u32,
    pub cols: u32,
    pub total_value: f64,
    pub mean_score: f64,
    pub scoring_cells: usize,
    pub threatened_cells: usize,
    pub biomes: BTreeMap<Biome, usize>,
}

impl GridStats {
    #[must_use]
    pub fn from_records(records: &[MergedCellRecord]) -> Self {
        let mut biomes = BTreeMap::new();
        for record in records {
            *biomes.entry(record.cell.cell.biome.clone()).or_insert(0) += 1;
        }
        let cells = records.len();
        let score_sum: f64 = records.iter().map(|r| r.score).sum();
        Self {
            cells,
            rows: records.iter().map(|r| r.cell.cell.row + 1).max().unwrap_or(0),
            cols: records.iter().map(|r| r.cell.cell.col + 1).max().unwrap_or(0),
            total_value: records.iter().map(|r| r.total_value).sum(),
            mean_score: if cells > 0 { score_sum / cells as f64 } else { 0.0 },
            scoring_cells: records.iter().filter(|r| r.score > 0.0).count(),
            threatened_cells: records
                .iter()
                .filter(|r| r.cell.threatened_life() > 0)
                .count(),
            biomes,
        }
    }
}

/// Writes the summary; the top table lists at most `top` cells.
pub fn write_markdown<W: Write>(
    out: &mut W,
    records: &[MergedCellRecord],
    report: Option<&RunReport>,
    top: usize,
) -> fmt::Result {
    let stats = GridStats::from_records(records);

    writeln!(out, "# Abyssal Grid Report\n")?;
    writeln!(out, "## Summary")?;
    writeln!(out, "- **Cells**: {} ({} × {})", stats.cells, stats.rows, stats.cols)?;
    writeln!(out, "- **Total Value**: {:.2}", stats.total_value)?;
    writeln!(out, "- **Mean Score**: {:.4}", stats.mean_score)?;
    writeln!(out, "- **Cells With Positive Score**: {}", stats.scoring_cells)?;
    writeln!(out, "- **Cells With Threatened Life**: {}\n", stats.threatened_cells)?;

    writeln!(out, "## Biomes")?;
    for (biome, count) in &stats.biomes {
        writeln!(out, "- {biome}: {count}")?;
    }
    writeln!(out)?;

    let ranked = rank_cells(records, top);
    writeln!(out, "## Top Cells ({})", ranked.len())?;
    writeln!(out, "| # | cell | biome | total value | difficulty | score |")?;
    writeln!(out, "|---|------|-------|-------------|------------|-------|")?;
    for (i, record) in ranked.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {:.2} | {:.3} | {:.4} |",
            i + 1,
            record.key(),
            record.cell.cell.biome,
            record.total_value,
            record.difficulty,
            record.score
        )?;
    }

    if let Some(report) = report {
        writeln!(out, "\n## Run {}", report.run_id)?;
        writeln!(out, "- **Generated**: {}", report.generated_at)?;
        writeln!(out, "- **Config Fingerprint**: `{}`", report.config_fingerprint)?;
        writeln!(out, "- **Total Time**: {:.1} ms", report.metrics.total_ms())?;
        writeln!(out, "- **Warnings**: {}", report.warnings.len())?;
        for warning in report.warnings.iter() {
            writeln!(out, "  - {warning}")?;
        }
    }

    Ok(())
}

/// [`write_markdown`] into a fresh string.
#[must_use]
pub fn render_markdown(records: &[MergedCellRecord], report: Option<&RunReport>, top: usize) -> String {
    let mut out = String::new();
    write_markdown(&mut out, records, report, top).ok();
    out
}
