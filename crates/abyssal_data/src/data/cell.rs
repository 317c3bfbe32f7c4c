use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub row: u32,
    pub col: u32,
}

impl CellKey {
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Implemented by every source record that belongs to exactly one grid cell.
pub trait CellKeyed {
    fn key(&self) -> CellKey;
}

/// Seafloor environment category shared by many cells.
///
/// Parsing is lenient: survey exports use labels such as `abyssal_plain` or
/// `hydrothermal_vent`, so the five known categories are recognised by a
/// whole `_`/`-`/space separated keyword. Any other label is kept, trimmed
/// and lowercased, as [`Biome::Other`] and only equals the same label. An
/// empty label is [`Biome::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Biome {
    Slope,
    Seamount,
    Plain,
    Trench,
    Hydrothermal,
    Other(String),
    #[default]
    Unknown,
}

const KEYWORDS: [(&str, Biome); 9] = [
    ("hydrothermal", Biome::Hydrothermal),
    ("vent", Biome::Hydrothermal),
    ("vents", Biome::Hydrothermal),
    ("seamount", Biome::Seamount),
    ("seamounts", Biome::Seamount),
    ("trench", Biome::Trench),
    ("slope", Biome::Slope),
    ("plain", Biome::Plain),
    ("plains", Biome::Plain),
];

impl Biome {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.is_empty() || lowered == "unknown" {
            return Self::Unknown;
        }
        let tokens: Vec<&str> = lowered
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| tokens.contains(keyword))
            .map_or_else(|| Self::Other(lowered.clone()), |(_, biome)| biome.clone())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Slope => "slope",
            Self::Seamount => "seamount",
            Self::Plain => "plain",
            Self::Trench => "trench",
            Self::Hydrothermal => "hydrothermal",
            Self::Other(label) => label,
            Self::Unknown => "unknown",
        }
    }

    /// Whether the label was empty. Such cells take no biome-wide data.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<String> for Biome {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Biome> for String {
    fn from(biome: Biome) -> Self {
        match biome {
            Biome::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base entity: one row of the cell table.
///
/// `depth` and `pressure` stay optional at load time; the score engine
/// rejects a cell that lacks either instead of inventing a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
    #[serde(default, alias = "depth_m", deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub depth: Option<f64>,
    #[serde(default)]
    pub biome: Biome,
    #[serde(default, alias = "pressure_atm", deserialize_with = "crate::data::missing_as_none::deserialize")]
    pub pressure: Option<f64>,
    #[serde(
        default,
        rename = "temp",
        alias = "temperature",
        alias = "temperature_c",
        deserialize_with = "crate::data::missing_as_none::deserialize"
    )]
    pub temperature: Option<f64>,
}

impl CellKeyed for GridCell {
    fn key(&self) -> CellKey {
        CellKey::new(self.row, self.col)
    }
}
