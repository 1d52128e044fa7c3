//! Relation member decoding.
//!
//! Members are stored flattened: every three consecutive entries encode one
//! member's type, reference and role. Each entry is a
//! `(positionLabel, value)` pair; only the value is read.
use thiserror::Error;

use crate::{MemberRecord, RawPair};

const TRIPLET: usize = 3;
const VALUE_FIELD: usize = 1;

/// Errors returned by [`decode_members`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberListError {
    /// The flattened list does not split into whole triplets.
    #[error("member list has {len} entries, which is not a multiple of 3")]
    NotTriplets {
        /// Number of encoded entries.
        len: usize,
    },
    /// An entry was not a `(positionLabel, value)` pair.
    #[error("member entry {index} has {arity} fields, expected 2")]
    EntryArity {
        /// Position of the entry in the flattened list.
        index: usize,
        /// Number of fields found.
        arity: usize,
    },
    /// A reference value was absent or not an integer.
    #[error("member entry {index} has invalid reference {value:?}")]
    InvalidRef {
        /// Position of the entry in the flattened list.
        index: usize,
        /// Raw value, if one was stored.
        value: Option<String>,
    },
}

/// Decode a flattened member list into member records.
///
/// Decoding is all-or-nothing: on error no records are returned.
///
/// # Examples
/// ```
/// use osm_export_core::{RawPair, decode_members};
///
/// # fn main() -> Result<(), osm_export_core::MemberListError> {
/// let members = decode_members(&[
///     RawPair::from(("type", "way")),
///     RawPair::from(("ref", "5")),
///     RawPair::from(("role", "outer")),
/// ])?;
/// assert_eq!(members[0].reference, 5);
/// # Ok(())
/// # }
/// ```
pub fn decode_members(raw: &[RawPair]) -> Result<Vec<MemberRecord>, MemberListError> {
    let triplets = raw.chunks_exact(TRIPLET);
    if !triplets.remainder().is_empty() {
        return Err(MemberListError::NotTriplets { len: raw.len() });
    }

    triplets
        .enumerate()
        .map(|(position, triplet)| decode_triplet(position * TRIPLET, triplet))
        .collect()
}

fn decode_triplet(offset: usize, triplet: &[RawPair]) -> Result<MemberRecord, MemberListError> {
    let [member_type, reference, role] = triplet else {
        return Err(MemberListError::NotTriplets { len: triplet.len() });
    };
    let member_type = entry_value(offset, member_type)?;
    let reference = parse_reference(offset + 1, entry_value(offset + 1, reference)?)?;
    let role = entry_value(offset + 2, role)?;
    Ok(MemberRecord {
        member_type: member_type.unwrap_or_default().to_owned(),
        reference,
        role: role.unwrap_or_default().to_owned(),
    })
}

fn entry_value(index: usize, entry: &RawPair) -> Result<Option<&str>, MemberListError> {
    let arity = entry.fields().len();
    if arity != 2 {
        return Err(MemberListError::EntryArity { index, arity });
    }
    Ok(entry.field(VALUE_FIELD))
}

fn parse_reference(index: usize, value: Option<&str>) -> Result<i64, MemberListError> {
    value
        .and_then(|text| text.trim().parse().ok())
        .ok_or_else(|| MemberListError::InvalidRef {
            index,
            value: value.map(str::to_owned),
        })
}
