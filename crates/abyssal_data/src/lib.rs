//! # Abyssal Data
//!
//! Plain typed records shared by every crate in the workspace: the base
//! [`GridCell`], the one-to-many side records keyed by [`CellKey`], the
//! biome-scoped [`FoodWebLink`], and the merged per-cell output.

pub mod data;

pub use data::cell::{Biome, CellKey, CellKeyed, GridCell};
pub use data::merged::{FoodWebEdge, JoinedCell, MergedCellRecord};
pub use data::missing_as_none::{is_missing_marker, MISSING_MARKERS};
pub use data::records::{
    CoralRecord, CurrentRecord, FoodWebLink, HazardRecord, IucnStatus, LifeRecord,
    ParseIucnError, PointOfInterest, ResourceRecord,
};
