//! Typed source tables as handed to the merge stages.

use abyssal_data::{
    CoralRecord, CurrentRecord, FoodWebLink, GridCell, HazardRecord, LifeRecord,
    PointOfInterest, ResourceRecord,
};

/// How rows of a table are attached to cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// The join spine itself.
    Base,
    /// Many rows per cell, kept in source order.
    CellFanIn,
    /// At most one row per cell; the last row in source order wins.
    CellSingular,
    /// Grouped by biome and copied onto every cell of that biome.
    BiomeBroadcast,
}

/// The eight input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Cells,
    Resources,
    Hazards,
    Life,
    Poi,
    Corals,
    Currents,
    FoodWeb,
}

impl SourceKind {
    pub const ALL: [Self; 8] = [
        Self::Cells,
        Self::Resources,
        Self::Hazards,
        Self::Life,
        Self::Poi,
        Self::Corals,
        Self::Currents,
        Self::FoodWeb,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cells => "cells",
            Self::Resources => "resources",
            Self::Hazards => "hazards",
            Self::Life => "life",
            Self::Poi => "poi",
            Self::Corals => "corals",
            Self::Currents => "currents",
            Self::FoodWeb => "food_web",
        }
    }

    #[must_use]
    pub const fn mode(self) -> AggregationMode {
        match self {
            Self::Cells => AggregationMode::Base,
            Self::Resources | Self::Hazards | Self::Life | Self::Poi => {
                AggregationMode::CellFanIn
            }
            Self::Corals | Self::Currents => AggregationMode::CellSingular,
            Self::FoodWeb => AggregationMode::BiomeBroadcast,
        }
    }

    /// Columns that must exist in the header; each entry lists accepted
    /// spellings.
    #[must_use]
    pub const fn key_columns(self) -> &'static [&'static [&'static str]] {
        match self.mode() {
            AggregationMode::BiomeBroadcast => &[&["biome", "biome_overlap"]],
            _ => &[&["row"], &["col"]],
        }
    }
}

/// A decoded record together with the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord<T> {
    pub line: usize,
    pub record: T,
}

/// All rows of one table, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRows<T> {
    pub source: String,
    pub rows: Vec<LineRecord<T>>,
}

impl<T> SourceRows<T> {
    #[must_use]
    pub fn new<S: Into<String>>(source: S, rows: Vec<LineRecord<T>>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    #[must_use]
    pub fn empty<S: Into<String>>(source: S) -> Self {
        Self::new(source, Vec::new())
    }

    /// Rows numbered as if line 1 were the header.
    #[must_use]
    pub fn from_records<S: Into<String>>(source: S, records: Vec<T>) -> Self {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| LineRecord { line: i + 2, record })
            .collect();
        Self::new(source, rows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|r| &r.record)
    }
}

/// Read-only snapshot of every table for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSet {
    pub cells: SourceRows<GridCell>,
    pub resources: SourceRows<ResourceRecord>,
    pub hazards: SourceRows<HazardRecord>,
    pub life: SourceRows<LifeRecord>,
    pub poi: SourceRows<PointOfInterest>,
    pub corals: SourceRows<CoralRecord>,
    pub currents: SourceRows<CurrentRecord>,
    pub food_web: SourceRows<FoodWebLink>,
}

impl SourceSet {
    /// A snapshot with the given cells and every side table empty.
    #[must_use]
    pub fn with_cells(cells: SourceRows<GridCell>) -> Self {
        Self {
            cells,
            resources: SourceRows::empty(SourceKind::Resources.name()),
            hazards: SourceRows::empty(SourceKind::Hazards.name()),
            life: SourceRows::empty(SourceKind::Life.name()),
            poi: SourceRows::empty(SourceKind::Poi.name()),
            corals: SourceRows::empty(SourceKind::Corals.name()),
            currents: SourceRows::empty(SourceKind::Currents.name()),
            food_web: SourceRows::empty(SourceKind::FoodWeb.name()),
        }
    }

    /// Row count per table, in [`SourceKind::ALL`] order.
    #[must_use]
    pub fn row_counts(&self) -> [(SourceKind, usize); 8] {
        [
            (SourceKind::Cells, self.cells.len()),
            (SourceKind::Resources, self.resources.len()),
            (SourceKind::Hazards, self.hazards.len()),
            (SourceKind::Life, self.life.len()),
            (SourceKind::Poi, self.poi.len()),
            (SourceKind::Corals, self.corals.len()),
            (SourceKind::Currents, self.currents.len()),
            (SourceKind::FoodWeb, self.food_web.len()),
        ]
    }
}
