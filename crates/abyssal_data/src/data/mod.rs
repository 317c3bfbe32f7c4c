//! Typed records for the abyssal survey grid.

pub mod cell;
pub mod merged;
pub mod missing_as_none;
pub mod records;
