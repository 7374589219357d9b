//! Address autocomplete against the camera reference table.
//!
//! Canonical keys use `_` between words (`"Broadway_42nd_St"`). Two
//! derived forms exist:
//!
//! - the **display** form replaces separators with spaces and collapses
//!   whitespace (`"Broadway 42nd St"`);
//! - the **match** form is the display form lower-cased
//!   (`"broadway 42nd st"`).
//!
//! A query matches a camera when the lower-cased query is a contiguous
//! substring of the camera's match form. Selecting a suggestion always
//! hands back the canonical key, never the display form, since that is
//! what the backend expects.

use parking_spotter_camera_models::ADDRESS_SEPARATOR;

use crate::CameraTable;

/// Maximum number of suggestions shown by bounded list surfaces.
pub const SUGGESTION_LIMIT: usize = 10;

/// A suggestion ready to present to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion<'a> {
    /// Canonical key to hand back on selection.
    pub key: &'a str,
    /// Human-readable form of the key.
    pub display: String,
}

/// Formats a canonical key for display.
///
/// Separators become spaces, runs of whitespace collapse to a single space,
/// and leading/trailing whitespace is removed. Case is preserved.
#[must_use]
pub fn display_address(key: &str) -> String {
    key.replace(ADDRESS_SEPARATOR, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a canonical key for matching: the display form, lower-cased.
#[must_use]
pub fn normalize_for_match(key: &str) -> String {
    display_address(key).to_lowercase()
}

/// Strips markup characters (`<`, `>`) from free-text input.
///
/// Whitespace is kept so the result can be passed straight to [`suggest`].
#[must_use]
pub fn sanitize_input(input: &str) -> String {
    input.replace(['<', '>'], "")
}

/// Returns the canonical keys whose match form contains `query`.
///
/// Whitespace-only queries yield nothing. The query is lower-cased but
/// otherwise used as typed. Results follow dataset order and are truncated
/// to `limit` when one is given.
#[must_use]
pub fn suggest<'a>(query: &str, table: &'a CameraTable, limit: Option<usize>) -> Vec<&'a str> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let matches = table
        .match_candidates()
        .filter(|(_, match_key)| match_key.contains(needle.as_str()))
        .map(|(key, _)| key);

    match limit {
        Some(limit) => matches.take(limit).collect(),
        None => matches.collect(),
    }
}

/// Like [`suggest`], but pairs each key with its display form.
#[must_use]
pub fn suggestions<'a>(
    query: &str,
    table: &'a CameraTable,
    limit: Option<usize>,
) -> Vec<Suggestion<'a>> {
    suggest(query, table, limit)
        .into_iter()
        .map(|key| Suggestion {
            key,
            display: display_address(key),
        })
        .collect()
}
