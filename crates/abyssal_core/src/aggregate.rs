//! Per-cell aggregation of the one-to-many tables.
//!
//! Two strategies are used, selected by [`SourceKind::mode`]:
//!
//! - **cell fan-in**: rows grouped by `(row, col)`, source order kept inside
//!   each group (resources, hazards, life, poi) or reduced to the last row
//!   (corals, currents);
//! - **biome broadcast**: food-web links grouped by biome, later copied onto
//!   every cell of that biome by the join.
//!
//! Rows pointing at an unknown cell or biome are dropped with a warning.

use crate::join::CellIndex;
use crate::normalize::normalize_list;
use crate::sources::{SourceKind, SourceRows, SourceSet};
use crate::warnings::{Warning, Warnings};
use abyssal_data::{
    Biome, CellKeyed, CoralRecord, CurrentRecord, FoodWebEdge, FoodWebLink, HazardRecord,
    IucnStatus, LifeRecord, ResourceRecord,
};
use std::collections::HashMap;

/// Flattened life observations of one cell. All four vectors have the same
/// length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifeGroup {
    pub species: Vec<String>,
    pub iucn: Vec<IucnStatus>,
    pub density: Vec<Option<f64>>,
    pub prey: Vec<Vec<String>>,
}

impl LifeGroup {
    fn absorb(&mut self, record: &LifeRecord) {
        let prey = normalize_list(record.prey_species.as_deref());
        for species in normalize_list(record.species.as_deref()) {
            self.species.push(species);
            self.iucn.push(record.iucn);
            self.density.push(record.density);
            self.prey.push(prey.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Food-web links grouped by biome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiomeAggregates {
    groups: HashMap<Biome, Vec<FoodWebEdge>>,
}

impl BiomeAggregates {
    /// Links of `biome`, empty when it has none.
    #[must_use]
    pub fn for_biome(&self, biome: &Biome) -> &[FoodWebEdge] {
        self.groups.get(biome).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn biome_count(&self) -> usize {
        self.groups.len()
    }
}

/// Every aggregate, indexed by cell position in the base table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAggregates {
    pub resources: Vec<Vec<ResourceRecord>>,
    pub hazards: Vec<Vec<HazardRecord>>,
    pub life: Vec<LifeGroup>,
    pub poi: Vec<Vec<String>>,
    pub corals: Vec<Option<CoralRecord>>,
    pub currents: Vec<Option<CurrentRecord>>,
    pub food_web: BiomeAggregates,
}

impl CellAggregates {
    /// Aggregates for `cells` cells with every relation empty.
    #[must_use]
    pub fn empty(cells: usize) -> Self {
        Self {
            resources: vec![Vec::new(); cells],
            hazards: vec![Vec::new(); cells],
            life: vec![LifeGroup::default(); cells],
            poi: vec![Vec::new(); cells],
            corals: vec![None; cells],
            currents: vec![None; cells],
            food_web: BiomeAggregates::default(),
        }
    }
}

/// Groups `rows` by cell, mapping each kept row through `f`.
///
/// The outer vector has one entry per base cell; cells without rows get an
/// empty group.
pub fn fan_in<T, U, F>(
    index: &CellIndex,
    rows: &SourceRows<T>,
    warnings: &mut Warnings,
    mut f: F,
) -> Vec<Vec<U>>
where
    T: CellKeyed,
    U: Clone,
    F: FnMut(&T) -> U,
{
    let mut groups = vec![Vec::new(); index.len()];
    for row in &rows.rows {
        let key = row.record.key();
        match index.position(key) {
            Some(position) => groups[position].push(f(&row.record)),
            None => warnings.push(Warning::orphan(&rows.source, row.line, key)),
        }
    }
    groups
}

/// Keeps the last row per cell. Each replaced row is reported.
pub fn last_wins<T>(index: &CellIndex, rows: &SourceRows<T>, warnings: &mut Warnings) -> Vec<Option<T>>
where
    T: CellKeyed + Clone,
{
    let mut slots: Vec<Option<T>> = vec![None; index.len()];
    for row in &rows.rows {
        let key = row.record.key();
        let Some(position) = index.position(key) else {
            warnings.push(Warning::orphan(&rows.source, row.line, key));
            continue;
        };
        if slots[position].replace(row.record.clone()).is_some() {
            warnings.push(Warning::duplicate(&rows.source, row.line, key));
        }
    }
    slots
}

/// Flattens the life table per cell, normalising species and prey lists.
pub fn aggregate_life(
    index: &CellIndex,
    rows: &SourceRows<LifeRecord>,
    warnings: &mut Warnings,
) -> Vec<LifeGroup> {
    let mut groups = vec![LifeGroup::default(); index.len()];
    for row in &rows.rows {
        let key = row.record.key();
        match index.position(key) {
            Some(position) => groups[position].absorb(&row.record),
            None => warnings.push(Warning::orphan(&rows.source, row.line, key)),
        }
    }
    groups
}

/// Groups food-web links by biome. Links for a biome that no cell has are
/// dropped with a warning.
pub fn group_by_biome(
    index: &CellIndex,
    rows: &SourceRows<FoodWebLink>,
    warnings: &mut Warnings,
) -> BiomeAggregates {
    let mut groups: HashMap<Biome, Vec<FoodWebEdge>> = HashMap::new();
    for row in &rows.rows {
        let link = &row.record;
        if !index.has_biome(&link.biome) {
            warnings.push(Warning::OrphanBiome {
                source: rows.source.clone(),
                line: row.line,
                biome: link.biome.clone(),
            });
            continue;
        }
        groups.entry(link.biome.clone()).or_default().push(FoodWebEdge {
            predator: link.predator.clone(),
            prey: normalize_list(link.prey.as_deref()),
            interaction_strength: link.interaction_strength,
        });
    }
    BiomeAggregates { groups }
}

/// Runs every table through its aggregation mode.
pub fn aggregate(index: &CellIndex, sources: &SourceSet, warnings: &mut Warnings) -> CellAggregates {
    let aggregates = CellAggregates {
        resources: fan_in(index, &sources.resources, warnings, Clone::clone),
        hazards: fan_in(index, &sources.hazards, warnings, Clone::clone),
        life: aggregate_life(index, &sources.life, warnings),
        poi: fan_in(index, &sources.poi, warnings, |p| p.label.clone()),
        corals: last_wins(index, &sources.corals, warnings),
        currents: last_wins(index, &sources.currents, warnings),
        food_web: group_by_biome(index, &sources.food_web, warnings),
    };
    tracing::debug!(
        biomes = aggregates.food_web.biome_count(),
        source = SourceKind::FoodWeb.name(),
        "Grouped food web by biome"
    );
    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use abyssal_data::{CellKey, GridCell, PointOfInterest};

    fn cell(row: u32, col: u32, biome: Biome) -> GridCell {
        GridCell {
            row,
            col,
            lat: 0.0,
            lon: 0.0,
            depth: Some(1500.0),
            biome,
            pressure: Some(150.0),
            temperature: None,
        }
    }

    fn grid_2x2() -> CellIndex {
        let cells = SourceRows::from_records(
            "cells.csv",
            vec![
                cell(0, 0, Biome::Plain),
                cell(0, 1, Biome::Plain),
                cell(1, 0, Biome::Trench),
                cell(1, 1, Biome::Seamount),
            ],
        );
        CellIndex::build(&cells, true).unwrap()
    }

    fn hazard(row: u32, col: u32, kind: &str, severity: f64) -> HazardRecord {
        HazardRecord {
            row,
            col,
            hazard_type: kind.into(),
            severity,
        }
    }

    fn life(row: u32, col: u32, species: &str, iucn: IucnStatus, prey: &str) -> LifeRecord {
        LifeRecord {
            row,
            col,
            species: Some(species.into()),
            density: Some(0.5),
            iucn,
            prey_species: Some(prey.into()),
        }
    }

    #[test]
    fn test_fan_in_keeps_source_order_and_empty_groups() {
        let index = grid_2x2();
        let rows = SourceRows::from_records(
            "hazards.csv",
            vec![
                hazard(1, 1, "vent", 3.0),
                hazard(0, 0, "slide", 1.0),
                hazard(1, 1, "quake", 2.0),
            ],
        );
        let mut warnings = Warnings::new();
        let groups = fan_in(&index, &rows, &mut warnings, Clone::clone);

        assert!(warnings.is_empty());
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].len(), 1);
        assert!(groups[1].is_empty());
        assert!(groups[2].is_empty());
        let kinds: Vec<_> = groups[3].iter().map(|h| h.hazard_type.as_str()).collect();
        assert_eq!(kinds, vec!["vent", "quake"]);
    }

    #[test]
    fn test_orphan_rows_dropped_with_warning() {
        let index = grid_2x2();
        let rows = SourceRows::from_records(
            "poi.csv",
            vec![
                PointOfInterest {
                    row: 7,
                    col: 0,
                    label: "Wreck".into(),
                },
                PointOfInterest {
                    row: 0,
                    col: 1,
                    label: "Chimney".into(),
                },
            ],
        );
        let mut warnings = Warnings::new();
        let groups = fan_in(&index, &rows, &mut warnings, |p| p.label.clone());

        assert_eq!(groups[1], vec!["Chimney".to_string()]);
        assert_eq!(
            warnings.into_vec(),
            vec![Warning::orphan("poi.csv", 2, CellKey::new(7, 0))]
        );
    }

    #[test]
    fn test_life_rows_flatten_with_parallel_status() {
        let index = grid_2x2();
        let rows = SourceRows::from_records(
            "life.csv",
            vec![
                life(1, 1, "Anglerfish", IucnStatus::Endangered, " Ray, Squid"),
                life(1, 1, "Gulper eel", IucnStatus::DataDeficient, ""),
            ],
        );
        let mut warnings = Warnings::new();
        let groups = aggregate_life(&index, &rows, &mut warnings);
        let group = &groups[3];

        assert_eq!(group.len(), 2);
        assert_eq!(group.species, vec!["Anglerfish", "Gulper eel"]);
        assert_eq!(
            group.iucn,
            vec![IucnStatus::Endangered, IucnStatus::DataDeficient]
        );
        assert_eq!(group.prey[0], vec!["Ray", "Squid"]);
        assert!(group.prey[1].is_empty());
        assert!(groups[0].is_empty());
    }

    #[test]
    fn test_life_species_list_carries_status_to_each_species() {
        let index = grid_2x2();
        let rows = SourceRows::from_records(
            "life.csv",
            vec![
                life(0, 0, ",Tubeworm, Yeti crab,", IucnStatus::Vulnerable, "Bacteria"),
                life(0, 0, "Tubeworm", IucnStatus::Vulnerable, ""),
            ],
        );
        let mut warnings = Warnings::new();
        let group = &aggregate_life(&index, &rows, &mut warnings)[0];

        assert_eq!(group.species, vec!["Tubeworm", "Yeti crab", "Tubeworm"]);
        assert!(group.iucn.iter().all(|s| *s == IucnStatus::Vulnerable));
        assert_eq!(group.prey[1], vec!["Bacteria"]);
        assert_eq!(group.density.len(), 3);
    }

    #[test]
    fn test_last_wins_reports_duplicates() {
        let index = grid_2x2();
        let coral = |cover: f64| CoralRecord {
            row: 0,
            col: 1,
            cover_pct: Some(cover),
            health_index: None,
            bleaching_risk: None,
            biodiversity_index: None,
        };
        let rows = SourceRows::from_records("corals.csv", vec![coral(10.0), coral(35.0)]);
        let mut warnings = Warnings::new();
        let slots = last_wins(&index, &rows, &mut warnings);

        assert_eq!(slots[1].as_ref().and_then(|c| c.cover_pct), Some(35.0));
        assert!(slots[0].is_none());
        assert_eq!(
            warnings.into_vec(),
            vec![Warning::duplicate("corals.csv", 3, CellKey::new(0, 1))]
        );
    }

    #[test]
    fn test_food_web_grouped_by_biome() {
        let index = grid_2x2();
        let link = |biome: Biome, predator: &str, prey: &str| FoodWebLink {
            biome,
            predator: predator.into(),
            prey: Some(prey.into()),
            interaction_strength: Some(0.4),
        };
        let rows = SourceRows::from_records(
            "food_web.csv",
            vec![
                link(Biome::Plain, "Grenadier", "Amphipod, ,Squid"),
                link(Biome::Hydrothermal, "Vent crab", "Tubeworm"),
                link(Biome::Plain, "Rattail", ""),
            ],
        );
        let mut warnings = Warnings::new();
        let groups = group_by_biome(&index, &rows, &mut warnings);

        let plain = groups.for_biome(&Biome::Plain);
        assert_eq!(plain.len(), 2);
        assert_eq!(plain[0].prey, vec!["Amphipod", "Squid"]);
        assert!(plain[1].prey.is_empty());
        assert!(groups.for_biome(&Biome::Trench).is_empty());
        assert_eq!(warnings.count_orphans(), 1);
    }

    #[test]
    fn test_unrecognised_biomes_match_only_their_own_label() {
        let seep = Biome::parse("cold_seep");
        let hills = Biome::parse("abyssal_hills");
        let cells = SourceRows::from_records(
            "cells.csv",
            vec![cell(0, 0, seep.clone()), cell(0, 1, hills.clone()), cell(0, 2, Biome::Unknown)],
        );
        let index = CellIndex::build(&cells, true).unwrap();
        let link = |biome: &str, predator: &str| FoodWebLink {
            biome: Biome::parse(biome),
            predator: predator.into(),
            prey: None,
            interaction_strength: None,
        };
        let rows = SourceRows::from_records(
            "food_web.csv",
            vec![
                link("kelp_forest", "Sea otter"),
                link("Cold_Seep", "Ice worm"),
                link("", "Drifter"),
            ],
        );
        let mut warnings = Warnings::new();
        let groups = group_by_biome(&index, &rows, &mut warnings);

        assert_eq!(groups.for_biome(&seep).len(), 1);
        assert_eq!(groups.for_biome(&seep)[0].predator, "Ice worm");
        assert!(groups.for_biome(&hills).is_empty());
        assert!(groups.for_biome(&Biome::Unknown).is_empty());
        assert_eq!(groups.biome_count(), 1);
        assert_eq!(warnings.count_orphans(), 2);
    }
}
