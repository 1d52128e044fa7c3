//! Header configuration lookup and overrides.
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Value};

use osm_export_core::{DocumentHeader, HeaderRow};

/// Table holding the optional header configuration row.
pub const HEADER_TABLE: &str = "osm_file_config";

/// Read the header configuration and resolve it against the defaults.
///
/// Only the first row is consulted. A missing table or a failing query is
/// logged and treated like an absent row, so header problems never abort an
/// export.
///
/// # Examples
/// ```
/// use osm_export_core::DocumentHeader;
/// use osm_export_data::resolve_header;
/// use rusqlite::Connection;
///
/// let connection = Connection::open_in_memory().expect("in-memory database");
/// assert_eq!(resolve_header(&connection), DocumentHeader::default());
/// ```
pub fn resolve_header(connection: &Connection) -> DocumentHeader {
    let row = match read_header_row(connection) {
        Ok(row) => row,
        Err(err) => {
            warn!("Could not read {HEADER_TABLE}: {err}; using document defaults");
            None
        }
    };
    DocumentHeader::resolve(row)
}

/// Fetch the first configuration row, if any.
pub fn read_header_row(connection: &Connection) -> Result<Option<HeaderRow>, rusqlite::Error> {
    connection
        .query_row(
            "SELECT version, download, upload, locked, generator FROM osm_file_config LIMIT 1",
            [],
            header_row,
        )
        .optional()
}

/// Replace the configuration table's contents with a single row.
///
/// Fields set in `overrides` win over the first existing row; unset fields
/// keep whatever a table-config script stored. The table is created when
/// missing, and the delete and insert share one transaction. When
/// `overrides` sets nothing the table is left untouched.
///
/// # Examples
/// ```
/// use osm_export_core::HeaderRow;
/// use osm_export_data::{resolve_header, write_header_config};
/// use rusqlite::Connection;
///
/// let connection = Connection::open_in_memory().expect("in-memory database");
/// let overrides = HeaderRow {
///     generator: Some("parks_export".to_owned()),
///     ..HeaderRow::default()
/// };
/// write_header_config(&connection, &overrides).expect("write header");
/// assert_eq!(resolve_header(&connection).generator, "parks_export");
/// ```
pub fn write_header_config(
    connection: &Connection,
    overrides: &HeaderRow,
) -> Result<(), rusqlite::Error> {
    if *overrides == HeaderRow::default() {
        return Ok(());
    }
    let transaction = connection.unchecked_transaction()?;
    transaction.execute_batch(
        "CREATE TABLE IF NOT EXISTS osm_file_config (
            version TEXT,
            download TEXT,
            upload TEXT,
            locked TEXT,
            generator TEXT
        );",
    )?;
    let stored = read_header_row(&transaction)?.unwrap_or_default();
    let merged = HeaderRow {
        version: overrides.version.clone().or(stored.version),
        download: overrides.download.clone().or(stored.download),
        upload: overrides.upload.clone().or(stored.upload),
        locked: overrides.locked.clone().or(stored.locked),
        generator: overrides.generator.clone().or(stored.generator),
    };
    transaction.execute("DELETE FROM osm_file_config", [])?;
    transaction.execute(
        "INSERT INTO osm_file_config (version, download, upload, locked, generator)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            merged.version,
            merged.download,
            merged.upload,
            merged.locked,
            merged.generator
        ],
    )?;
    transaction.commit()?;
    info!("Wrote header overrides to {HEADER_TABLE}");
    Ok(())
}

fn header_row(row: &Row<'_>) -> Result<HeaderRow, rusqlite::Error> {
    Ok(HeaderRow {
        version: text(row.get(0)?),
        download: text(row.get(1)?),
        upload: text(row.get(2)?),
        locked: text(row.get(3)?),
        generator: text(row.get(4)?),
    })
}

// Column affinity is not enforced, so any storage class may turn up.
fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Text(text) => Some(text),
        Value::Blob(bytes) => String::from_utf8(bytes).ok(),
    }
}
