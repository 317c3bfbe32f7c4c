use super::cell::{Biome, CellKey, CellKeyed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// IUCN Red List category attached to a life observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum IucnStatus {
    #[serde(rename = "CR")]
    CriticallyEndangered,
    #[serde(rename = "EN")]
    Endangered,
    #[serde(rename = "VU")]
    Vulnerable,
    #[serde(rename = "NT")]
    NearThreatened,
    #[serde(rename = "LC")]
    LeastConcern,
    /// Used whenever the source leaves the status blank.
    #[default]
    #[serde(rename = "DD")]
    DataDeficient,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised IUCN status: {0:?}")]
pub struct ParseIucnError(pub String);

impl IucnStatus {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CriticallyEndangered => "CR",
            Self::Endangered => "EN",
            Self::Vulnerable => "VU",
            Self::NearThreatened => "NT",
            Self::LeastConcern => "LC",
            Self::DataDeficient => "DD",
        }
    }

    /// CR, EN and VU count against a cell's mining score.
    #[must_use]
    pub const fn is_threatened(self) -> bool {
        matches!(
            self,
            Self::CriticallyEndangered | Self::Endangered | Self::Vulnerable
        )
    }
}

impl FromStr for IucnStatus {
    type Err = ParseIucnError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "" | "DD" | "DATA DEFICIENT" | "NAN" | "NA" => Ok(Self::DataDeficient),
            "CR" | "CRITICALLY ENDANGERED" => Ok(Self::CriticallyEndangered),
            "EN" | "ENDANGERED" => Ok(Self::Endangered),
            "VU" | "VULNERABLE" => Ok(Self::Vulnerable),
            "NT" | "NEAR THREATENED" => Ok(Self::NearThreatened),
            "LC" | "LEAST CONCERN" => Ok(Self::LeastConcern),
            _ => Err(ParseIucnError(raw.to_string())),
        }
    }
}

impl TryFrom<String> for IucnStatus {
    type Error = ParseIucnError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl fmt::Display for IucnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Harvestable deposit observed in a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub row: u32,
    pub col: u32,
    #[serde(rename = "type", alias = "resource_type")]
    pub resource_type: String,
    #[serde(default)]
    pub family: Option<String>,
    pub abundance: f64,
    #[serde(alias = "unit_value", alias = "value")]
    pub economic_value: f64,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub purity: Option<f64>,
}

impl ResourceRecord {
    /// Abundance times unit value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.abundance * self.economic_value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRecord {
    pub row: u32,
    pub col: u32,
    #[serde(rename = "type", alias = "hazard_type")]
    pub hazard_type: String,
    pub severity: f64,
}

/// One row of the life table. The list-valued columns stay raw here and
/// are normalised during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeRecord {
    pub row: u32,
    pub col: u32,
    #[serde(default, alias = "species_name")]
    pub species: Option<String>,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub density: Option<f64>,
    #[serde(default, alias = "iucn_status", alias = "threat_level")]
    pub iucn: IucnStatus,
    #[serde(default, alias = "prey")]
    pub prey_species: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub row: u32,
    pub col: u32,
    #[serde(alias = "poi_label", alias = "name")]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoralRecord {
    pub row: u32,
    pub col: u32,
    #[serde(default, alias = "coral_cover_pct", deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub cover_pct: Option<f64>,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub health_index: Option<f64>,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub bleaching_risk: Option<f64>,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub biodiversity_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRecord {
    pub row: u32,
    pub col: u32,
    pub u_mps: f64,
    pub v_mps: f64,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub speed_mps: Option<f64>,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub stability: Option<f64>,
    #[serde(default)]
    pub flow_direction: Option<String>,
}

impl CurrentRecord {
    /// Recorded speed, or the magnitude of (u, v) when the source omits it.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed_mps.unwrap_or_else(|| self.u_mps.hypot(self.v_mps))
    }
}

/// Predator/prey link scoped to a whole biome rather than a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodWebLink {
    #[serde(alias = "biome_overlap")]
    pub biome: Biome,
    pub predator: String,
    #[serde(default, alias = "prey_species")]
    pub prey: Option<String>,
    #[serde(default, deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub interaction_strength: Option<f64>,
}

macro_rules! impl_cell_keyed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CellKeyed for $ty {
                fn key(&self) -> CellKey {
                    CellKey::new(self.row, self.col)
                }
            }
        )*
    };
}

impl_cell_keyed!(
    ResourceRecord,
    HazardRecord,
    LifeRecord,
    PointOfInterest,
    CoralRecord,
    CurrentRecord,
);
