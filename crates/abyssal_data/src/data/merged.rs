use super::cell::{CellKey, GridCell};
use super::records::{CoralRecord, CurrentRecord, HazardRecord, IucnStatus, ResourceRecord};
use serde::{Deserialize, Serialize};

/// A biome-level food-web link after prey-list normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodWebEdge {
    pub predator: String,
    pub prey: Vec<String>,
    pub interaction_strength: Option<f64>,
}

/// One grid cell with every relation attached, before scoring.
///
/// `life_iucn`, `life_density` and `life_prey` are parallel to `life`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedCell {
    #[serde(flatten)]
    pub cell: GridCell,
    pub resources: Vec<ResourceRecord>,
    pub hazards: Vec<HazardRecord>,
    pub life: Vec<String>,
    pub life_iucn: Vec<IucnStatus>,
    pub life_density: Vec<Option<f64>>,
    pub life_prey: Vec<Vec<String>>,
    pub poi: Vec<String>,
    pub coral: Option<CoralRecord>,
    pub current: Option<CurrentRecord>,
    pub food_web: Vec<FoodWebEdge>,
}

impl JoinedCell {
    /// A cell with no relations attached.
    #[must_use]
    pub fn bare(cell: GridCell) -> Self {
        Self {
            cell,
            resources: Vec::new(),
            hazards: Vec::new(),
            life: Vec::new(),
            life_iucn: Vec::new(),
            life_density: Vec::new(),
            life_prey: Vec::new(),
            poi: Vec::new(),
            coral: None,
            current: None,
            food_web: Vec::new(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> CellKey {
        CellKey::new(self.cell.row, self.cell.col)
    }

    #[must_use]
    pub fn hazard_severity(&self) -> f64 {
        self.hazards.iter().map(|h| h.severity).sum()
    }

    #[must_use]
    pub fn threatened_life(&self) -> usize {
        self.life_iucn.iter().filter(|s| s.is_threatened()).count()
    }
}

/// Output entity of a pipeline run: the joined cell plus its derived scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedCellRecord {
    #[serde(flatten)]
    pub cell: JoinedCell,
    pub total_value: f64,
    pub difficulty: f64,
    pub score: f64,
}

impl MergedCellRecord {
    #[must_use]
    pub const fn key(&self) -> CellKey {
        self.cell.key()
    }
}
