//! SQLite and filesystem plumbing around the OSM document exporter.
//!
//! Responsibilities:
//! - Parse `database.schema.table` export targets and derive file locations.
//! - Run the SQL script stages that prepare and tear down the normalised
//!   tables.
//! - Stream normalised rows out of SQLite as a [`RowSource`].
//! - Resolve the document header from its configuration table and write
//!   configured header overrides into it.
//! - Write finished documents atomically to disk.
//!
//! Boundaries:
//! - Document rules (tag filtering, member decoding, markup) live in
//!   `osm-export-core`.
//!
//! Invariants:
//! - A failed export never leaves a partial document on disk.
//!
//! [`RowSource`]: osm_export_core::RowSource

#![forbid(unsafe_code)]

mod encoding;
mod export;
mod header;
mod scripts;
mod sqlite;
mod target;

pub use encoding::{EncodingError, decode_node_refs, decode_pairs};
pub use export::{ExportFileError, export_document_to_path};
pub use header::{HEADER_TABLE, read_header_row, resolve_header, write_header_config};
pub use scripts::{
    ScriptError, ScriptRunner, ScriptStage, StageOutcome, quote_identifier, render_script,
};
pub use sqlite::{
    NODES_TABLE, RELATIONS_TABLE, RowOrder, RowOrderParseError, SqliteRowSource,
    SqliteRowSourceError, WAYS_TABLE, create_export_tables, open_database,
};
pub use target::{TableTarget, TargetParseError};
