//! Join engine: one output row per base cell, every aggregate attached.

use crate::aggregate::CellAggregates;
use crate::error::JoinError;
use crate::sources::SourceRows;
use abyssal_data::{Biome, CellKey, CellKeyed, GridCell, JoinedCell};
use std::collections::HashMap;

/// Position of every base cell in source order, plus the biome membership
/// used for broadcasting.
#[derive(Debug, Clone)]
pub struct CellIndex {
    keys: Vec<CellKey>,
    positions: HashMap<CellKey, usize>,
    biomes: Vec<Biome>,
}

impl CellIndex {
    /// Builds the index, rejecting duplicate keys and, when `require_dense`
    /// is set, grids with holes.
    pub fn build(cells: &SourceRows<GridCell>, require_dense: bool) -> Result<Self, JoinError> {
        if cells.is_empty() {
            return Err(JoinError::EmptyGrid {
                source_name: cells.source.clone(),
            });
        }

        let mut keys = Vec::with_capacity(cells.len());
        let mut biomes = Vec::with_capacity(cells.len());
        let mut positions = HashMap::with_capacity(cells.len());
        let mut lines: HashMap<CellKey, usize> = HashMap::with_capacity(cells.len());

        for row in &cells.rows {
            let key = row.record.key();
            if let Some(&first_line) = lines.get(&key) {
                return Err(JoinError::DuplicateCell {
                    source_name: cells.source.clone(),
                    key,
                    first_line,
                    line: row.line,
                });
            }
            lines.insert(key, row.line);
            positions.insert(key, keys.len());
            keys.push(key);
            biomes.push(row.record.biome.clone());
        }

        let index = Self {
            keys,
            positions,
            biomes,
        };
        if require_dense {
            index.check_dense()?;
        }
        Ok(index)
    }

    fn check_dense(&self) -> Result<(), JoinError> {
        let max_row = self.keys.iter().map(|k| k.row).max().unwrap_or(0);
        let max_col = self.keys.iter().map(|k| k.col).max().unwrap_or(0);
        let rows = max_row.saturating_add(1);
        let cols = max_col.saturating_add(1);
        let expected = rows as usize * cols as usize;
        if expected == self.keys.len() {
            return Ok(());
        }

        let first_missing = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| CellKey::new(r, c)))
            .find(|k| !self.positions.contains_key(k))
            .unwrap_or(CellKey::new(max_row, max_col));

        Err(JoinError::IncompleteGrid {
            rows,
            cols,
            expected,
            found: self.keys.len(),
            first_missing,
        })
    }

    #[must_use]
    pub fn position(&self, key: CellKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether some cell carries `biome`. Never true for
    /// [`Biome::Unknown`], which no biome-wide data can target.
    #[must_use]
    pub fn has_biome(&self, biome: &Biome) -> bool {
        !biome.is_unknown() && self.biomes.contains(biome)
    }

    /// Biome of the cell at `position`.
    #[must_use]
    pub fn biome_at(&self, position: usize) -> &Biome {
        &self.biomes[position]
    }
}

/// Left-joins the base cells against every aggregate.
///
/// The output has exactly one entry per base cell, in base order. Per-cell
/// sequences are moved out of `aggregates`; biome aggregates are cloned into
/// each member cell.
#[must_use]
pub fn join(
    index: &CellIndex,
    cells: &SourceRows<GridCell>,
    aggregates: CellAggregates,
) -> Vec<JoinedCell> {
    let CellAggregates {
        resources,
        hazards,
        life,
        poi,
        corals,
        currents,
        food_web,
    } = aggregates;

    let mut resources = resources.into_iter();
    let mut hazards = hazards.into_iter();
    let mut life = life.into_iter();
    let mut poi = poi.into_iter();
    let mut corals = corals.into_iter();
    let mut currents = currents.into_iter();

    cells
        .records()
        .enumerate()
        .map(|(position, cell)| {
            let mut joined = JoinedCell::bare(cell.clone());
            joined.resources = resources.next().unwrap_or_default();
            joined.hazards = hazards.next().unwrap_or_default();
            if let Some(group) = life.next() {
                joined.life = group.species;
                joined.life_iucn = group.iucn;
                joined.life_density = group.density;
                joined.life_prey = group.prey;
            }
            joined.poi = poi.next().unwrap_or_default();
            joined.coral = corals.next().flatten();
            joined.current = currents.next().flatten();
            joined.food_web = food_web.for_biome(index.biome_at(position)).to_vec();
            joined
        })
        .collect()
}
