//! The merged artifact: one flat CSV row per grid cell.
//!
//! Name lists (`resource_type`, `hazard_type`, `life`, `poi`,
//! `biome_predators`) are comma-joined and decode through the normalizer.
//! Every other list column is parallel to one of those anchors and is decoded
//! by position: `resource_*` follow `resource_type`, `hazard_severity`
//! follows `hazard_type`, `life_*` follow `life`, `biome_*` follow
//! `biome_predators`. Nested lists (`life_prey`, `biome_prey`) put `|`
//! between entries and `,` inside an entry.

use crate::error::{ExportError, Result};
use crate::table::{Table, TableRow};
use crate::validate::GROUP_DELIMITER;
use abyssal_core::{join_list, normalize_list, normalize::LIST_DELIMITER};
use abyssal_data::{
    Biome, CoralRecord, CurrentRecord, FoodWebEdge, GridCell, HazardRecord, IucnStatus,
    JoinedCell, MergedCellRecord, ResourceRecord,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Column order of the merged artifact.
pub const MERGED_COLUMNS: [&str; 35] = [
    "row",
    "col",
    "lat",
    "lon",
    "depth",
    "biome",
    "pressure",
    "temp",
    "resource_type",
    "resource_family",
    "resource_abundance",
    "resource_economic_value",
    "resource_purity",
    "hazard_type",
    "hazard_severity",
    "life",
    "life_iucn",
    "life_density",
    "life_prey",
    "poi",
    "coral_cover_pct",
    "coral_health_index",
    "coral_bleaching_risk",
    "coral_biodiversity_index",
    "current_u_mps",
    "current_v_mps",
    "current_speed_mps",
    "current_stability",
    "current_flow_direction",
    "biome_predators",
    "biome_prey",
    "biome_interaction_strengths",
    "total_value",
    "difficulty",
    "score",
];

fn num(value: f64) -> String {
    value.to_string()
}

fn opt(value: Option<f64>) -> String {
    value.map(num).unwrap_or_default()
}

fn joined<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    items
        .into_iter()
        .collect::<Vec<_>>()
        .join(&LIST_DELIMITER.to_string())
}

fn groups(lists: &[Vec<String>]) -> String {
    lists
        .iter()
        .map(|list| join_list(list))
        .collect::<Vec<_>>()
        .join(&GROUP_DELIMITER.to_string())
}

/// Flattens one record into [`MERGED_COLUMNS`] order.
#[must_use]
pub fn encode_record(record: &MergedCellRecord) -> Vec<String> {
    let joined_cell = &record.cell;
    let cell = &joined_cell.cell;
    let resources = &joined_cell.resources;
    let coral = joined_cell.coral.as_ref();
    let current = joined_cell.current.as_ref();
    let food_web = &joined_cell.food_web;

    vec![
        cell.row.to_string(),
        cell.col.to_string(),
        num(cell.lat),
        num(cell.lon),
        opt(cell.depth),
        cell.biome.as_str().to_string(),
        opt(cell.pressure),
        opt(cell.temperature),
        joined(resources.iter().map(|r| r.resource_type.clone())),
        joined(resources.iter().map(|r| r.family.clone().unwrap_or_default())),
        joined(resources.iter().map(|r| num(r.abundance))),
        joined(resources.iter().map(|r| num(r.economic_value))),
        joined(resources.iter().map(|r| opt(r.purity))),
        joined(joined_cell.hazards.iter().map(|h| h.hazard_type.clone())),
        joined(joined_cell.hazards.iter().map(|h| num(h.severity))),
        join_list(&joined_cell.life),
        joined(joined_cell.life_iucn.iter().map(|s| s.code().to_string())),
        joined(joined_cell.life_density.iter().map(|d| opt(*d))),
        groups(&joined_cell.life_prey),
        join_list(&joined_cell.poi),
        opt(coral.and_then(|c| c.cover_pct)),
        opt(coral.and_then(|c| c.health_index)),
        opt(coral.and_then(|c| c.bleaching_risk)),
        opt(coral.and_then(|c| c.biodiversity_index)),
        opt(current.map(|c| c.u_mps)),
        opt(current.map(|c| c.v_mps)),
        opt(current.and_then(|c| c.speed_mps)),
        opt(current.and_then(|c| c.stability)),
        current
            .and_then(|c| c.flow_direction.clone())
            .unwrap_or_default(),
        joined(food_web.iter().map(|e| e.predator.clone())),
        groups(&food_web.iter().map(|e| e.prey.clone()).collect::<Vec<_>>()),
        joined(food_web.iter().map(|e| opt(e.interaction_strength))),
        num(record.total_value),
        num(record.difficulty),
        num(record.score),
    ]
}

/// A fully written artifact next to its destination, not yet in place.
///
/// Dropping it without [`StagedArtifact::commit`] deletes the staged file and
/// leaves the destination untouched.
#[derive(Debug)]
#[must_use = "a staged artifact is discarded unless committed"]
pub struct StagedArtifact {
    staged: PathBuf,
    path: PathBuf,
    rows: usize,
    committed: bool,
}

impl StagedArtifact {
    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    /// Renames the staged file over the destination.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.staged, &self.path).map_err(|e| {
            ExportError::FileSystem(e).with_context(format!("replacing {}", self.path.display()))
        })?;
        self.committed = true;
        tracing::info!(path = %self.path.display(), rows = self.rows, "Merged artifact written");
        Ok(())
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        if !self.committed {
            fs::remove_file(&self.staged).ok();
        }
    }
}

/// Writes every record, in the given order, to a staging file beside `path`.
pub fn stage_merged<P: AsRef<Path>>(
    records: &[MergedCellRecord],
    path: P,
) -> Result<StagedArtifact> {
    let path = path.as_ref();
    let staged = StagedArtifact {
        staged: path.with_extension("tmp"),
        path: path.to_path_buf(),
        rows: records.len(),
        committed: false,
    };

    let written = (|| -> Result<()> {
        let mut writer = csv::Writer::from_path(&staged.staged)?;
        writer.write_record(MERGED_COLUMNS)?;
        for record in records {
            writer.write_record(encode_record(record))?;
        }
        writer.flush()?;
        Ok(())
    })();
    written.map_err(|err| err.with_context(format!("writing {}", path.display())))?;
    Ok(staged)
}

/// Writes records in the given order, replacing `path` only once every row
/// is on disk.
pub fn write_merged<P: AsRef<Path>>(records: &[MergedCellRecord], path: P) -> Result<()> {
    stage_merged(records, path)?.commit()
}

struct RowReader<'a> {
    table: &'a Table,
    row: &'a TableRow,
}

impl<'a> RowReader<'a> {
    fn text(&self, column: &str) -> Result<&'a str> {
        self.table
            .column_index(column)
            .and_then(|i| self.row.values.get(i))
            .ok_or_else(|| ExportError::decode(self.row.line, column, "column missing"))
    }

    fn parse<T>(&self, column: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let text = self.text(column)?;
        text.parse()
            .map_err(|e| ExportError::decode(self.row.line, column, format!("{text:?}: {e}")))
    }

    fn opt(&self, column: &str) -> Result<Option<f64>> {
        if self.text(column)?.is_empty() {
            Ok(None)
        } else {
            self.parse(column).map(Some)
        }
    }

    fn names(&self, column: &str) -> Result<Vec<String>> {
        Ok(normalize_list(Some(self.text(column)?)))
    }

    /// Exactly `len` positions split on `delimiter`; an empty column is zero
    /// positions only when `len` is zero.
    fn positions(&self, column: &str, len: usize, delimiter: char) -> Result<Vec<&'a str>> {
        let text = self.text(column)?;
        if len == 0 {
            if !text.is_empty() {
                return Err(ExportError::decode(self.row.line, column, "expected no entries"));
            }
            return Ok(Vec::new());
        }
        let parts: Vec<&str> = text.split(delimiter).collect();
        if parts.len() != len {
            return Err(ExportError::decode(
                self.row.line,
                column,
                format!("expected {len} entries, found {}", parts.len()),
            ));
        }
        Ok(parts)
    }

    fn parse_each<T>(&self, column: &str, len: usize) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.positions(column, len, LIST_DELIMITER)?
            .into_iter()
            .map(|p| {
                p.parse()
                    .map_err(|e| ExportError::decode(self.row.line, column, format!("{p:?}: {e}")))
            })
            .collect()
    }

    fn opt_each(&self, column: &str, len: usize) -> Result<Vec<Option<f64>>> {
        self.positions(column, len, LIST_DELIMITER)?
            .into_iter()
            .map(|p| {
                if p.is_empty() {
                    Ok(None)
                } else {
                    p.parse().map(Some).map_err(|e| {
                        ExportError::decode(self.row.line, column, format!("{p:?}: {e}"))
                    })
                }
            })
            .collect()
    }

    fn groups(&self, column: &str, len: usize) -> Result<Vec<Vec<String>>> {
        Ok(self
            .positions(column, len, GROUP_DELIMITER)?
            .into_iter()
            .map(|p| normalize_list(Some(p)))
            .collect())
    }

    fn record(&self) -> Result<MergedCellRecord> {
        let row: u32 = self.parse("row")?;
        let col: u32 = self.parse("col")?;
        let cell = GridCell {
            row,
            col,
            lat: self.parse("lat")?,
            lon: self.parse("lon")?,
            depth: self.opt("depth")?,
            biome: Biome::parse(self.text("biome")?),
            pressure: self.opt("pressure")?,
            temperature: self.opt("temp")?,
        };

        let types = self.names("resource_type")?;
        let n = types.len();
        let families = self.positions("resource_family", n, LIST_DELIMITER)?;
        let abundances: Vec<f64> = self.parse_each("resource_abundance", n)?;
        let values: Vec<f64> = self.parse_each("resource_economic_value", n)?;
        let purities = self.opt_each("resource_purity", n)?;
        let resources = types
            .into_iter()
            .enumerate()
            .map(|(i, resource_type)| ResourceRecord {
                row,
                col,
                resource_type,
                family: Some(families[i].to_string()).filter(|f| !f.is_empty()),
                abundance: abundances[i],
                economic_value: values[i],
                purity: purities[i],
            })
            .collect();

        let hazard_types = self.names("hazard_type")?;
        let severities: Vec<f64> = self.parse_each("hazard_severity", hazard_types.len())?;
        let hazards = hazard_types
            .into_iter()
            .zip(severities)
            .map(|(hazard_type, severity)| HazardRecord {
                row,
                col,
                hazard_type,
                severity,
            })
            .collect();

        let life = self.names("life")?;
        let n = life.len();
        let life_iucn: Vec<IucnStatus> = self.parse_each("life_iucn", n)?;
        let life_density = self.opt_each("life_density", n)?;
        let life_prey = self.groups("life_prey", n)?;

        let cover_pct = self.opt("coral_cover_pct")?;
        let health_index = self.opt("coral_health_index")?;
        let bleaching_risk = self.opt("coral_bleaching_risk")?;
        let biodiversity_index = self.opt("coral_biodiversity_index")?;
        let coral = [cover_pct, health_index, bleaching_risk, biodiversity_index]
            .iter()
            .any(Option::is_some)
            .then_some(CoralRecord {
                row,
                col,
                cover_pct,
                health_index,
                bleaching_risk,
                biodiversity_index,
            });

        let current = match self.opt("current_u_mps")? {
            Some(u_mps) => Some(CurrentRecord {
                row,
                col,
                u_mps,
                v_mps: self.parse("current_v_mps")?,
                speed_mps: self.opt("current_speed_mps")?,
                stability: self.opt("current_stability")?,
                flow_direction: Some(self.text("current_flow_direction")?.to_string())
                    .filter(|d| !d.is_empty()),
            }),
            None => None,
        };

        let predators = self.names("biome_predators")?;
        let n = predators.len();
        let prey = self.groups("biome_prey", n)?;
        let strengths = self.opt_each("biome_interaction_strengths", n)?;
        let food_web = predators
            .into_iter()
            .zip(prey)
            .zip(strengths)
            .map(|((predator, prey), interaction_strength)| FoodWebEdge {
                predator,
                prey,
                interaction_strength,
            })
            .collect();

        Ok(MergedCellRecord {
            cell: JoinedCell {
                cell,
                resources,
                hazards,
                life,
                life_iucn,
                life_density,
                life_prey,
                poi: self.names("poi")?,
                coral,
                current,
                food_web,
            },
            total_value: self.parse("total_value")?,
            difficulty: self.parse("difficulty")?,
            score: self.parse("score")?,
        })
    }
}

/// Decodes every row of a loaded merged artifact, in file order.
pub fn read_merged(table: &Table) -> Result<Vec<MergedCellRecord>> {
    let required: Vec<&[&str]> = MERGED_COLUMNS.iter().map(std::slice::from_ref).collect();
    table.require_columns(&required)?;
    table
        .rows()
        .iter()
        .map(|row| RowReader { table, row }.record())
        .collect()
}

/// Loads and decodes a merged artifact from disk.
pub fn load_merged<P: AsRef<Path>>(path: P) -> Result<Vec<MergedCellRecord>> {
    let table = Table::load(path)?;
    read_merged(&table)
}
