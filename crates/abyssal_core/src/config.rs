//! Configuration management for pipeline runs.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `abyssal.toml` file. Every field has a default, so a partial file only
//! overrides what it names.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `abyssal.toml` file (overrides defaults)
//! 3. CLI flags for output paths
//!
//! ## Example `abyssal.toml`
//!
//! ```toml
//! [sources]
//! base_dir = "Abyssal_World"
//! cells = "cells.csv"
//! resources = "resources.csv"
//!
//! [score]
//! hazard_weight = 2.0
//! ecological_weight = 2.0
//!
//! [pipeline]
//! require_dense_grid = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Location of every source table.
///
/// Side tables are optional: an unset or empty path (`poi = ""`) means the
/// table is skipped and every cell gets an empty relation for it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub base_dir: Option<PathBuf>,
    pub cells: PathBuf,
    pub resources: Option<PathBuf>,
    pub hazards: Option<PathBuf>,
    pub life: Option<PathBuf>,
    pub poi: Option<PathBuf>,
    pub corals: Option<PathBuf>,
    pub currents: Option<PathBuf>,
    pub food_web: Option<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_dir: Some(PathBuf::from("Abyssal_World")),
            cells: PathBuf::from("cells.csv"),
            resources: Some(PathBuf::from("resources.csv")),
            hazards: Some(PathBuf::from("hazards.csv")),
            life: Some(PathBuf::from("life.csv")),
            poi: Some(PathBuf::from("poi.csv")),
            corals: Some(PathBuf::from("corals.csv")),
            currents: Some(PathBuf::from("currents.csv")),
            food_web: Some(PathBuf::from("food_web.csv")),
        }
    }
}

impl SourcesConfig {
    /// Joins a configured path onto `base_dir`. Absolute paths are kept as is.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The configured side-table path, or `None` when it is unset or empty.
    #[must_use]
    pub fn side(&self, path: Option<&Path>) -> Option<PathBuf> {
        path.filter(|p| !p.as_os_str().is_empty())
            .map(|p| self.resolve(p))
    }

    /// Configuration with only the mandatory cell table set.
    #[must_use]
    pub fn cells_only<P: Into<PathBuf>>(cells: P) -> Self {
        Self {
            base_dir: None,
            cells: cells.into(),
            resources: None,
            hazards: None,
            life: None,
            poi: None,
            corals: None,
            currents: None,
            food_web: None,
        }
    }
}

/// Named weights of the mining score.
///
/// ```text
/// difficulty = max(floor, base + depth_weight * depth / depth_scale
///                         + pressure_weight * pressure / pressure_scale
///                         + hazard_weight * sum(severity))
/// score      = max(0, value_weight * total_value / difficulty
///                     - ecological_weight * threatened_species)
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub value_weight: f64,
    pub base_difficulty: f64,
    pub depth_weight: f64,
    /// Meters per unit of depth difficulty.
    pub depth_scale: f64,
    pub pressure_weight: f64,
    /// Atmospheres per unit of pressure difficulty.
    pub pressure_scale: f64,
    pub hazard_weight: f64,
    /// Penalty per CR/EN/VU life record.
    pub ecological_weight: f64,
    pub difficulty_floor: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            value_weight: 1.0,
            base_difficulty: 1.0,
            depth_weight: 1.0,
            depth_scale: 1000.0,
            pressure_weight: 1.0,
            pressure_scale: 100.0,
            hazard_weight: 2.0,
            ecological_weight: 2.0,
            difficulty_floor: 1e-6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reject cell tables that do not cover every (row, col) of their extent.
    pub require_dense_grid: bool,
    /// Load source tables on the rayon pool instead of one after another.
    pub parallel_load: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            require_dense_grid: true,
            parallel_load: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output: PathBuf,
    pub json: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("merged.csv"),
            json: None,
            report: Some(PathBuf::from("merge_report.json")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub score: ScoreWeights,
    pub pipeline: PipelineConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    ///
    /// # Validation Rules
    /// - Every weight must be finite and non-negative
    /// - Scales and the difficulty floor must be strictly positive
    /// - The cell table path must not be empty
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.sources.cells.as_os_str().is_empty(),
            "Cell table path must not be empty"
        );

        let s = &self.score;
        for (name, weight) in [
            ("value_weight", s.value_weight),
            ("base_difficulty", s.base_difficulty),
            ("depth_weight", s.depth_weight),
            ("pressure_weight", s.pressure_weight),
            ("hazard_weight", s.hazard_weight),
            ("ecological_weight", s.ecological_weight),
        ] {
            anyhow::ensure!(
                weight.is_finite() && weight >= 0.0,
                "Score {name} must be finite and non-negative (got {weight})"
            );
        }
        anyhow::ensure!(
            s.depth_scale.is_finite() && s.depth_scale > 0.0,
            "Depth scale must be positive"
        );
        anyhow::ensure!(
            s.pressure_scale.is_finite() && s.pressure_scale > 0.0,
            "Pressure scale must be positive"
        );
        anyhow::ensure!(
            s.difficulty_floor.is_finite() && s.difficulty_floor > 0.0,
            "Difficulty floor must be positive"
        );

        anyhow::ensure!(
            !self.export.output.as_os_str().is_empty(),
            "Export output path must not be empty"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| e.context(format!("invalid config {}", path.display())))
    }

    /// Digest of everything that influences the merged output.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.sources).as_bytes());
        hasher.update(format!("{:?}", self.score).as_bytes());
        hasher.update(format!("{:?}", self.pipeline.require_dense_grid).as_bytes());
        hex::encode(hasher.finalize())
    }
}
