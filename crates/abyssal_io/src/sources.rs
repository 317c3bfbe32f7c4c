//! Loading every configured source table into a [`SourceSet`].

use crate::error::LoadError;
use crate::table::Table;
use abyssal_core::{SourceKind, SourceRows, SourceSet, SourcesConfig, Warning, Warnings};
use abyssal_data::{
    CoralRecord, CurrentRecord, FoodWebLink, GridCell, HazardRecord, LifeRecord,
    PointOfInterest, ResourceRecord,
};
use rayon::prelude::*;
use std::path::PathBuf;

enum Loaded {
    Cells(SourceRows<GridCell>),
    Resources(SourceRows<ResourceRecord>),
    Hazards(SourceRows<HazardRecord>),
    Life(SourceRows<LifeRecord>),
    Poi(SourceRows<PointOfInterest>),
    Corals(SourceRows<CoralRecord>),
    Currents(SourceRows<CurrentRecord>),
    FoodWeb(SourceRows<FoodWebLink>),
    Skipped(SourceKind),
}

/// Resolved location of a table, or `None` when it is not configured.
#[must_use]
pub fn source_path(config: &SourcesConfig, kind: SourceKind) -> Option<PathBuf> {
    match kind {
        SourceKind::Cells => Some(config.resolve(&config.cells)),
        SourceKind::Resources => config.side(config.resources.as_deref()),
        SourceKind::Hazards => config.side(config.hazards.as_deref()),
        SourceKind::Life => config.side(config.life.as_deref()),
        SourceKind::Poi => config.side(config.poi.as_deref()),
        SourceKind::Corals => config.side(config.corals.as_deref()),
        SourceKind::Currents => config.side(config.currents.as_deref()),
        SourceKind::FoodWeb => config.side(config.food_web.as_deref()),
    }
}

fn load_kind(config: &SourcesConfig, kind: SourceKind) -> Result<Loaded, LoadError> {
    let Some(path) = source_path(config, kind) else {
        return Ok(Loaded::Skipped(kind));
    };
    let table = Table::load(&path)?;
    table.require_columns(kind.key_columns())?;

    let loaded = match kind {
        SourceKind::Cells => Loaded::Cells(table.records()?),
        SourceKind::Resources => Loaded::Resources(table.records()?),
        SourceKind::Hazards => Loaded::Hazards(table.records()?),
        SourceKind::Life => Loaded::Life(table.records()?),
        SourceKind::Poi => Loaded::Poi(table.records()?),
        SourceKind::Corals => Loaded::Corals(table.records()?),
        SourceKind::Currents => Loaded::Currents(table.records()?),
        SourceKind::FoodWeb => Loaded::FoodWeb(table.records()?),
    };
    tracing::debug!(source = kind.name(), path = %path.display(), rows = table.len(), "Source loaded");
    Ok(loaded)
}

/// Loads the cell table and every configured side table.
///
/// With `parallel` set the tables are read on the rayon pool. Either way the
/// first failure in [`SourceKind::ALL`] order is the one reported, and an
/// unconfigured side table yields an empty table plus a
/// [`Warning::SourceSkipped`].
pub fn load_sources(
    config: &SourcesConfig,
    parallel: bool,
) -> Result<(SourceSet, Warnings), LoadError> {
    let loaded: Vec<Result<Loaded, LoadError>> = if parallel {
        SourceKind::ALL
            .par_iter()
            .map(|&kind| load_kind(config, kind))
            .collect()
    } else {
        SourceKind::ALL
            .iter()
            .map(|&kind| load_kind(config, kind))
            .collect()
    };

    let mut sources = SourceSet::with_cells(SourceRows::empty(SourceKind::Cells.name()));
    let mut warnings = Warnings::new();
    for result in loaded {
        match result? {
            Loaded::Cells(rows) => sources.cells = rows,
            Loaded::Resources(rows) => sources.resources = rows,
            Loaded::Hazards(rows) => sources.hazards = rows,
            Loaded::Life(rows) => sources.life = rows,
            Loaded::Poi(rows) => sources.poi = rows,
            Loaded::Corals(rows) => sources.corals = rows,
            Loaded::Currents(rows) => sources.currents = rows,
            Loaded::FoodWeb(rows) => sources.food_web = rows,
            Loaded::Skipped(kind) => warnings.push(Warning::SourceSkipped {
                source: kind.name().to_string(),
            }),
        }
    }
    Ok((sources, warnings))
}
