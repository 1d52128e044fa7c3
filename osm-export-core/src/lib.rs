//! Relational-to-document transform for OSM XML exports.
//!
//! Responsibilities:
//! - Model point, way and relation rows as produced by the upstream
//!   normalisation step.
//! - Decode encoded tag lists and triplet-encoded member lists.
//! - Stream a well-formed OSM 0.6 document to any `std::io::Write` sink.
//!
//! Boundaries:
//! - No database or filesystem access (lives in `osm-export-data`).
//! - No validation of coordinates, topology or cross references.
//!
//! Invariants:
//! - Single forward pass; nothing written is ever revised.
//! - Every attribute value is escaped before it reaches the sink.

#![forbid(unsafe_code)]

mod escape;
pub mod header;
mod members;
mod record;
mod serializer;
mod source;
mod tags;
pub mod test_support;

pub use escape::escape_markup;
pub use header::{DocumentHeader, HeaderRow};
pub use members::{MemberListError, decode_members};
pub use record::{
    MemberRecord, PointRecord, RawPair, RecordKind, RelationRecord, TagEntry, WayRecord,
};
pub use serializer::{DocumentSerializer, ExportSummary, serialize_document};
pub use source::{ExportError, RowSource, SourceError, Visitor};
pub use tags::normalize_tags;
