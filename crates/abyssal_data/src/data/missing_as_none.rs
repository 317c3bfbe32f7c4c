//! Optional measurements that survey exports sometimes spell as text.
//!
//! `NA`, `null` and `NaN` (any case) in a numeric column mean "no value".
//! Use as `#[serde(default, deserialize_with = "missing_as_none::deserialize")]`
//! on an `Option<f64>` field.

use serde::{de, Deserialize, Deserializer};

/// Whole-field spellings of a missing value, lowercase.
pub const MISSING_MARKERS: [&str; 3] = ["nan", "na", "null"];

/// True when the trimmed `text` is one of [`MISSING_MARKERS`].
#[must_use]
pub fn is_missing_marker(text: &str) -> bool {
    let text = text.trim();
    MISSING_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(text))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

pub fn deserialize<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(d)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() || is_missing_marker(text) {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid number {text:?}")))
        }
    }
}
