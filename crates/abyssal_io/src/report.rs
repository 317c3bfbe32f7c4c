//! Per-run report written next to the merged artifact.

use crate::error::Result;
use crate::serialization::{read_json_file, write_json_file};
use abyssal_core::{RunMetrics, SourceSet, Warnings};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What one pipeline run read, produced and recovered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// RFC 3339 timestamp of report creation.
    pub generated_at: String,
    pub config_fingerprint: String,
    pub source_rows: BTreeMap<String, usize>,
    pub cells: usize,
    pub warnings: Warnings,
    pub metrics: RunMetrics,
    pub output: PathBuf,
}

impl RunReport {
    #[must_use]
    pub fn new(
        config_fingerprint: String,
        sources: &SourceSet,
        cells: usize,
        warnings: Warnings,
        metrics: RunMetrics,
        output: PathBuf,
    ) -> Self {
        let source_rows = sources
            .row_counts()
            .into_iter()
            .map(|(kind, rows)| (kind.name().to_string(), rows))
            .collect();
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now().to_rfc3339(),
            config_fingerprint,
            source_rows,
            cells,
            warnings,
            metrics,
            output,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_file(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json_file(path)
    }
}
