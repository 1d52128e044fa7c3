//! Facade crate for the OSM export toolkit.
//!
//! This crate re-exports the core document transform and exposes the SQLite
//! row source and file export helpers behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use osm_export_core::{
    DocumentHeader, DocumentSerializer, ExportError, ExportSummary, HeaderRow, MemberListError,
    MemberRecord, PointRecord, RawPair, RecordKind, RelationRecord, RowSource, TagEntry,
    WayRecord, decode_members, escape_markup, normalize_tags, serialize_document,
};

#[cfg(feature = "store-sqlite")]
pub use osm_export_data::{
    ExportFileError, RowOrder, SqliteRowSource, TableTarget, export_document_to_path,
    resolve_header,
};
