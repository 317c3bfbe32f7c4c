//! Load-time validation of typed source records.
//!
//! Each record type cleans itself up after serde decoding: NaN in an
//! optional measurement becomes `None`, not-a-value text markers in optional
//! text become `None`, and anything the merge or the export encoding cannot
//! represent is rejected with a reason.

use abyssal_data::{
    is_missing_marker, CoralRecord, CurrentRecord, FoodWebLink, GridCell, HazardRecord,
    LifeRecord, PointOfInterest, ResourceRecord,
};

/// Separates per-entry groups in nested export columns.
pub const GROUP_DELIMITER: char = '|';

/// A decoded record that can check and clean itself.
pub trait Validate: Sized {
    /// Returns the cleaned record, or the reason it is unusable.
    fn validate(self) -> Result<Self, String>;
}

fn optional(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn finite(name: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{name} must be a finite number, got {value}"))
    }
}

fn non_negative(name: &str, value: f64) -> Result<f64, String> {
    let value = finite(name, value)?;
    if value < 0.0 {
        return Err(format!("{name} must be non-negative, got {value}"));
    }
    Ok(value)
}

fn optional_non_negative(name: &str, value: Option<f64>) -> Result<Option<f64>, String> {
    optional(value).map(|v| non_negative(name, v)).transpose()
}

fn optional_finite(name: &str, value: Option<f64>) -> Result<Option<f64>, String> {
    optional(value).map(|v| finite(name, v)).transpose()
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !is_missing_marker(v))
}

/// Text that ends up as one entry of a comma-joined export column.
fn label(name: &str, value: String) -> Result<String, String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(format!("{name} must not be empty"));
    }
    if value.contains(',') || value.contains(GROUP_DELIMITER) {
        return Err(format!("{name} {value:?} must not contain ',' or '{GROUP_DELIMITER}'"));
    }
    Ok(value)
}

fn optional_label(name: &str, value: Option<String>) -> Result<Option<String>, String> {
    optional_text(value).map(|v| label(name, v)).transpose()
}

/// A raw comma-delimited list; commas are its own delimiter, groups are not.
fn list_field(name: &str, value: Option<String>) -> Result<Option<String>, String> {
    match optional_text(value) {
        Some(v) if v.contains(GROUP_DELIMITER) => {
            Err(format!("{name} must not contain '{GROUP_DELIMITER}'"))
        }
        other => Ok(other),
    }
}

impl Validate for GridCell {
    fn validate(mut self) -> Result<Self, String> {
        self.lat = finite("lat", self.lat)?;
        self.lon = finite("lon", self.lon)?;
        self.depth = optional_non_negative("depth", self.depth)?;
        self.pressure = optional_non_negative("pressure", self.pressure)?;
        self.temperature = optional_finite("temp", self.temperature)?;
        Ok(self)
    }
}

impl Validate for ResourceRecord {
    fn validate(mut self) -> Result<Self, String> {
        self.resource_type = label("type", self.resource_type)?;
        self.family = optional_label("family", self.family)?;
        self.abundance = non_negative("abundance", self.abundance)?;
        self.economic_value = non_negative("economic_value", self.economic_value)?;
        self.purity = optional_finite("purity", self.purity)?;
        Ok(self)
    }
}

impl Validate for HazardRecord {
    fn validate(mut self) -> Result<Self, String> {
        self.hazard_type = label("type", self.hazard_type)?;
        self.severity = non_negative("severity", self.severity)?;
        Ok(self)
    }
}

impl Validate for LifeRecord {
    fn validate(mut self) -> Result<Self, String> {
        self.species = list_field("species", self.species)?;
        self.prey_species = list_field("prey_species", self.prey_species)?;
        self.density = optional_non_negative("density", self.density)?;
        Ok(self)
    }
}

impl Validate for PointOfInterest {
    fn validate(mut self) -> Result<Self, String> {
        self.label = label("label", self.label)?;
        Ok(self)
    }
}

impl Validate for CoralRecord {
    fn validate(mut self) -> Result<Self, String> {
        self.cover_pct = optional_non_negative("cover_pct", self.cover_pct)?;
        self.health_index = optional_finite("health_index", self.health_index)?;
        self.bleaching_risk = optional_finite("bleaching_risk", self.bleaching_risk)?;
        self.biodiversity_index = optional_finite("biodiversity_index", self.biodiversity_index)?;
        Ok(self)
    }
}

impl Validate for CurrentRecord {
    fn validate(mut self) -> Result<Self, String> {
        self.u_mps = finite("u_mps", self.u_mps)?;
        self.v_mps = finite("v_mps", self.v_mps)?;
        self.speed_mps = Some(match optional_non_negative("speed_mps", self.speed_mps)? {
            Some(speed) => speed,
            None => self.u_mps.hypot(self.v_mps),
        });
        self.stability = optional_finite("stability", self.stability)?;
        self.flow_direction = optional_text(self.flow_direction);
        Ok(self)
    }
}

impl Validate for FoodWebLink {
    fn validate(mut self) -> Result<Self, String> {
        self.predator = label("predator", self.predator)?;
        self.prey = list_field("prey", self.prey)?;
        self.interaction_strength = optional_finite("interaction_strength", self.interaction_strength)?;
        Ok(self)
    }
}
