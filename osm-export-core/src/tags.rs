//! Tag list normalisation.
//!
//! Upstream tag columns may contain placeholder pairs (both fields empty) and
//! malformed entries. Only pairs with exactly two non-empty fields survive.
use crate::{RawPair, TagEntry};

/// Decode an encoded tag list into valid entries, preserving input order.
///
/// An empty result is not an error: it means the owning element carries no
/// tags.
///
/// # Examples
/// ```
/// use osm_export_core::{RawPair, normalize_tags};
///
/// let tags = normalize_tags(&[RawPair::from(("", "")), RawPair::from(("name", "Test"))]);
/// assert_eq!(tags.len(), 1);
/// assert_eq!(tags[0].key, "name");
/// ```
pub fn normalize_tags(raw: &[RawPair]) -> Vec<TagEntry> {
    raw.iter().filter_map(valid_entry).collect()
}

fn valid_entry(pair: &RawPair) -> Option<TagEntry> {
    let [Some(key), Some(value)] = pair.fields() else {
        return None;
    };
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some(TagEntry {
        key: key.clone(),
        value: value.clone(),
    })
}
