pub mod macros;

use abyssal_core::AppConfig;
use abyssal_data::MergedCellRecord;
use abyssal_lib::pipeline::{self, RunSummary};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CELL_HEADER: [&str; 8] = ["row", "col", "lat", "lon", "depth", "biome", "pressure", "temp"];

type ConfigMod = Box<dyn FnOnce(&mut AppConfig)>;

/// Writes a survey's CSV tables into a temp directory and points a config
/// at them. Tables that receive no rows are left unconfigured.
#[allow(dead_code)]
pub struct SurveyBuilder {
    cells: Vec<Vec<String>>,
    tables: BTreeMap<&'static str, (Vec<&'static str>, Vec<Vec<String>>)>,
    config_mods: Vec<ConfigMod>,
}

#[allow(dead_code)]
impl SurveyBuilder {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            tables: BTreeMap::new(),
            config_mods: Vec::new(),
        }
    }

    /// A dense `rows × cols` grid of one biome at 1000 m and 100 atm.
    pub fn grid(mut self, rows: u32, cols: u32, biome: &str) -> Self {
        for row in 0..rows {
            for col in 0..cols {
                self = self.with_cell(row, col, Some(1000.0), biome);
            }
        }
        self
    }

    pub fn with_cell(self, row: u32, col: u32, depth: Option<f64>, biome: &str) -> Self {
        self.with_cell_fields(row, col, depth, biome, Some(100.0))
    }

    pub fn with_cell_fields(
        mut self,
        row: u32,
        col: u32,
        depth: Option<f64>,
        biome: &str,
        pressure: Option<f64>,
    ) -> Self {
        let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        self.cells.push(vec![
            row.to_string(),
            col.to_string(),
            (-10.0 - f64::from(row) * 0.1).to_string(),
            (150.0 + f64::from(col) * 0.1).to_string(),
            opt(depth),
            biome.to_string(),
            opt(pressure),
            "2.5".to_string(),
        ]);
        self
    }

    fn row(mut self, table: &'static str, header: &[&'static str], values: Vec<String>) -> Self {
        self.tables
            .entry(table)
            .or_insert_with(|| (header.to_vec(), Vec::new()))
            .1
            .push(values);
        self
    }

    pub fn with_resource(self, row: u32, col: u32, kind: &str, abundance: f64, value: f64) -> Self {
        self.row(
            "resources.csv",
            &["row", "col", "type", "family", "abundance", "economic_value", "purity"],
            vec![
                row.to_string(),
                col.to_string(),
                kind.to_string(),
                String::new(),
                abundance.to_string(),
                value.to_string(),
                String::new(),
            ],
        )
    }

    pub fn with_hazard(self, row: u32, col: u32, kind: &str, severity: f64) -> Self {
        self.row(
            "hazards.csv",
            &["row", "col", "type", "severity"],
            vec![row.to_string(), col.to_string(), kind.to_string(), severity.to_string()],
        )
    }

    pub fn with_life(self, row: u32, col: u32, species: &str, iucn: &str, prey: &str) -> Self {
        self.row(
            "life.csv",
            &["row", "col", "species", "density", "iucn_status", "prey_species"],
            vec![
                row.to_string(),
                col.to_string(),
                species.to_string(),
                "0.3".to_string(),
                iucn.to_string(),
                prey.to_string(),
            ],
        )
    }

    pub fn with_poi(self, row: u32, col: u32, label: &str) -> Self {
        self.row(
            "poi.csv",
            &["row", "col", "label"],
            vec![row.to_string(), col.to_string(), label.to_string()],
        )
    }

    pub fn with_coral(self, row: u32, col: u32, cover_pct: f64) -> Self {
        self.row(
            "corals.csv",
            &["row", "col", "coral_cover_pct", "health_index", "bleaching_risk", "biodiversity_index"],
            vec![
                row.to_string(),
                col.to_string(),
                cover_pct.to_string(),
                "0.8".to_string(),
                String::new(),
                "3.1".to_string(),
            ],
        )
    }

    pub fn with_current(self, row: u32, col: u32, u: f64, v: f64) -> Self {
        self.row(
            "currents.csv",
            &["row", "col", "u_mps", "v_mps", "stability", "flow_direction"],
            vec![
                row.to_string(),
                col.to_string(),
                u.to_string(),
                v.to_string(),
                "0.9".to_string(),
                "NE".to_string(),
            ],
        )
    }

    pub fn with_food_web(self, biome: &str, predator: &str, prey: &str, strength: Option<f64>) -> Self {
        self.row(
            "food_web.csv",
            &["biome_overlap", "predator", "prey_species", "interaction_strength"],
            vec![
                biome.to_string(),
                predator.to_string(),
                prey.to_string(),
                strength.map(|s| s.to_string()).unwrap_or_default(),
            ],
        )
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig) + 'static,
    {
        self.config_mods.push(Box::new(modifier));
        self
    }

    pub fn build(self) -> Survey {
        let dir = tempfile::tempdir().expect("Failed to create temp dir in test builder");
        write_csv(&dir.path().join("cells.csv"), &CELL_HEADER, &self.cells);

        let mut config = AppConfig::default();
        config.sources = abyssal_core::SourcesConfig::cells_only("cells.csv");
        config.sources.base_dir = Some(dir.path().to_path_buf());
        for (name, (header, rows)) in &self.tables {
            write_csv(&dir.path().join(name), header, rows);
            let path = Some(PathBuf::from(*name));
            match *name {
                "resources.csv" => config.sources.resources = path,
                "hazards.csv" => config.sources.hazards = path,
                "life.csv" => config.sources.life = path,
                "poi.csv" => config.sources.poi = path,
                "corals.csv" => config.sources.corals = path,
                "currents.csv" => config.sources.currents = path,
                "food_web.csv" => config.sources.food_web = path,
                other => panic!("unknown table {other}"),
            }
        }
        config.export.output = dir.path().join("out").join("merged.csv");
        config.export.report = Some(dir.path().join("out").join("merge_report.json"));
        config.export.json = None;

        for modifier in self.config_mods {
            modifier(&mut config);
        }
        Survey { dir, config }
    }
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create test CSV");
    writer.write_record(header).expect("Failed to write header");
    for row in rows {
        writer.write_record(row).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush test CSV");
}

/// A survey on disk plus the config that reads it.
#[allow(dead_code)]
pub struct Survey {
    pub dir: TempDir,
    pub config: AppConfig,
}

#[allow(dead_code)]
impl Survey {
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        pipeline::run(&self.config)
    }

    pub fn output(&self) -> &Path {
        &self.config.export.output
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// The record for `(row, col)`; panics when absent.
#[allow(dead_code)]
pub fn cell(records: &[MergedCellRecord], row: u32, col: u32) -> &MergedCellRecord {
    records
        .iter()
        .find(|r| r.cell.cell.row == row && r.cell.cell.col == col)
        .unwrap_or_else(|| panic!("cell ({row}, {col}) not in output"))
}
