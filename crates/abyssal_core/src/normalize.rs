//! Field normalisation for comma-delimited list columns.
//!
//! Survey exports write species and prey lists as free text such as
//! `",Anglerfish,  Gulper eel,"`. [`normalize_list`] turns that into the
//! ordered, trimmed, non-empty tokens. Order is kept and duplicates survive.

/// Separator between list entries.
pub const LIST_DELIMITER: char = ',';

/// Splits `raw` on commas, trims every token and drops empty ones.
///
/// A missing field yields an empty list, never `[""]`.
#[must_use]
pub fn normalize_list(raw: Option<&str>) -> Vec<String> {
    let Some(text) = raw else {
        return Vec::new();
    };
    text.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Inverse of [`normalize_list`] for already-clean tokens.
#[must_use]
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(LIST_DELIMITER);
        }
        out.push_str(item.as_ref());
    }
    out
}
