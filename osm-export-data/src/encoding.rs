//! Decoding of JSON-encoded list columns.
//!
//! Tag and member columns hold arrays of arrays of scalars, node references
//! hold an integer array. `NULL` columns decode as empty lists.
//!
//! Only the outer shape is enforced. An entry that is not an array of
//! scalars decodes as an empty [`RawPair`], which tag normalisation drops
//! and member decoding reports with its own typed error.
use osm_export_core::RawPair;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding a list column.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The column was not valid JSON of the expected shape.
    #[error("malformed {column} column")]
    Json {
        /// Column being decoded.
        column: &'static str,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Decode an array-of-pairs column (`tags` or `members`).
///
/// # Examples
/// ```
/// use osm_export_core::{RawPair, normalize_tags};
/// use osm_export_data::decode_pairs;
///
/// let pairs = decode_pairs("tags", Some(r#"[["name","Test"],"oops"]"#)).expect("array column");
/// assert_eq!(pairs[1], RawPair::default());
/// assert_eq!(normalize_tags(&pairs).len(), 1);
/// ```
pub fn decode_pairs(
    column: &'static str,
    encoded: Option<&str>,
) -> Result<Vec<RawPair>, EncodingError> {
    let Some(text) = encoded else {
        return Ok(Vec::new());
    };
    let entries: Vec<Value> =
        serde_json::from_str(text).map_err(|source| EncodingError::Json { column, source })?;
    Ok(entries.into_iter().map(entry_to_pair).collect())
}

fn entry_to_pair(entry: Value) -> RawPair {
    match entry {
        Value::Array(fields) => fields
            .into_iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()
            .map_or_else(RawPair::default, RawPair::new),
        _ => RawPair::default(),
    }
}

// `None` marks a nested value. Numbers keep their JSON spelling so large
// identifiers are not rounded.
fn scalar_text(field: Value) -> Option<Option<String>> {
    match field {
        Value::Null => Some(None),
        Value::String(text) => Some(Some(text)),
        Value::Number(number) => Some(Some(number.to_string())),
        Value::Bool(flag) => Some(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Decode the `node_refs` column.
pub fn decode_node_refs(encoded: Option<&str>) -> Result<Vec<i64>, EncodingError> {
    let Some(text) = encoded else {
        return Ok(Vec::new());
    };
    serde_json::from_str(text).map_err(|source| EncodingError::Json {
        column: "node_refs",
        source,
    })
}
