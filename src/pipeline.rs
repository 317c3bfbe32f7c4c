//! One full run: load → merge → export → report.

use abyssal_core::{merge, AppConfig, RunMetrics, Warnings};
use abyssal_data::MergedCellRecord;
use abyssal_io::{load_sources, stage_merged, write_json_file, RunReport};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// What a completed run leaves behind.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub records: Vec<MergedCellRecord>,
    pub warnings: Warnings,
    pub report: RunReport,
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display())),
        _ => Ok(()),
    }
}

/// Runs the whole pipeline for `config`.
///
/// Nothing is written unless loading, merging and scoring all succeed. The
/// CSV artifact is staged first and moved into place only after the JSON
/// export and run report are written.
pub fn run(config: &AppConfig) -> Result<RunSummary> {
    config.validate().context("invalid configuration")?;
    let mut metrics = RunMetrics::new();

    let start = Instant::now();
    let (sources, mut warnings) = load_sources(&config.sources, config.pipeline.parallel_load)
        .context("loading source tables")?;
    let loaded_rows = sources.row_counts().iter().map(|(_, n)| n).sum();
    metrics.record("load", start.elapsed(), loaded_rows);

    let outcome = merge(&sources, config).context("merging source tables")?;
    warnings.extend(outcome.warnings);
    metrics.merge(outcome.metrics);
    let records = outcome.records;

    let export = &config.export;
    ensure_parent(&export.output)?;
    let staged = metrics
        .time("export", || (stage_merged(&records, &export.output), records.len()))
        .with_context(|| format!("exporting {}", export.output.display()))?;

    if let Some(json) = &export.json {
        ensure_parent(json)?;
        metrics
            .time("export_json", || (write_json_file(&records, json), records.len()))
            .with_context(|| format!("exporting {}", json.display()))?;
    }

    let report = RunReport::new(
        config.fingerprint(),
        &sources,
        records.len(),
        warnings.clone(),
        metrics,
        export.output.clone(),
    );
    if let Some(path) = &export.report {
        ensure_parent(path)?;
        report
            .save(path)
            .with_context(|| format!("writing run report {}", path.display()))?;
    }
    staged
        .commit()
        .with_context(|| format!("exporting {}", export.output.display()))?;

    tracing::info!(
        cells = records.len(),
        warnings = warnings.len(),
        total_ms = report.metrics.total_ms(),
        output = %export.output.display(),
        "Run complete"
    );

    Ok(RunSummary {
        records,
        warnings,
        report,
    })
}
