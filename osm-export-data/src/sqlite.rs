//! SQLite-backed row source reading the normalised OSM tables.

use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

use osm_export_core::{
    ExportError, PointRecord, RecordKind, RelationRecord, RowSource, Visitor, WayRecord,
};

use crate::encoding::{EncodingError, decode_node_refs, decode_pairs};

/// Table holding point rows.
pub const NODES_TABLE: &str = "osm_nodes";
/// Table holding way rows.
pub const WAYS_TABLE: &str = "osm_ways";
/// Table holding relation rows.
pub const RELATIONS_TABLE: &str = "osm_relations";

/// Order in which rows are read from each table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowOrder {
    /// Whatever order SQLite yields; not guaranteed stable.
    #[default]
    Storage,
    /// Ascending identifier order, for reproducible exports.
    Id,
}

impl RowOrder {
    fn clause(self) -> &'static str {
        match self {
            Self::Storage => "",
            Self::Id => " ORDER BY id",
        }
    }
}

/// Error returned when parsing a [`RowOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown row order {0:?} (expected `storage` or `id`)")]
pub struct RowOrderParseError(String);

impl FromStr for RowOrder {
    type Err = RowOrderParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "storage" => Ok(Self::Storage),
            "id" => Ok(Self::Id),
            _ => Err(RowOrderParseError(raw.to_owned())),
        }
    }
}

/// Errors raised while reading rows from SQLite.
#[derive(Debug, Error)]
pub enum SqliteRowSourceError {
    /// Opening the database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database location.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or stepping the query failed.
    #[error("failed to query {table}")]
    Query {
        /// Table being read.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A list column could not be decoded.
    #[error("failed to decode row {id} of {table}")]
    Decode {
        /// Table being read.
        table: &'static str,
        /// Identifier of the offending row.
        id: i64,
        /// Decoding failure.
        #[source]
        source: EncodingError,
    },
}

/// Open an existing database for the export pipeline.
///
/// The database is opened read-write so setup scripts can run, but it is
/// never created: a missing file is an error.
pub fn open_database(path: &Utf8Path) -> Result<Connection, SqliteRowSourceError> {
    Connection::open_with_flags(
        path.as_std_path(),
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| SqliteRowSourceError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Streams point, way and relation rows from an open connection.
///
/// # Examples
/// ```
/// use osm_export_core::RowSource;
/// use osm_export_data::{RowOrder, SqliteRowSource, create_export_tables};
/// use rusqlite::Connection;
///
/// let connection = Connection::open_in_memory().expect("in-memory database");
/// create_export_tables(&connection).expect("create tables");
/// connection
///     .execute(
///         "INSERT INTO osm_nodes (id, action, lat, lon, tags) VALUES (1, 'modify', 51.5, -0.1, NULL)",
///         [],
///     )
///     .expect("insert node");
///
/// let source = SqliteRowSource::new(&connection, RowOrder::Id);
/// let mut ids = Vec::new();
/// source
///     .visit_points(&mut |point| {
///         ids.push(point.id);
///         Ok(())
///     })
///     .expect("read points");
/// assert_eq!(ids, vec![1]);
/// ```
#[derive(Debug)]
pub struct SqliteRowSource<'conn> {
    connection: &'conn Connection,
    order: RowOrder,
}

impl<'conn> SqliteRowSource<'conn> {
    /// Read from `connection`, ordering rows as requested.
    pub const fn new(connection: &'conn Connection, order: RowOrder) -> Self {
        Self { connection, order }
    }

    fn visit_rows<T>(
        &self,
        kind: RecordKind,
        table: &'static str,
        columns: &str,
        decode: fn(&Row<'_>) -> Result<T, SqliteRowSourceError>,
        visitor: &mut Visitor<'_, T>,
    ) -> Result<(), ExportError> {
        let query = format!("SELECT {columns} FROM {table}{}", self.order.clause());
        let upstream = |source: rusqlite::Error| {
            ExportError::upstream(kind, SqliteRowSourceError::Query { table, source })
        };
        let mut statement = self.connection.prepare(&query).map_err(upstream)?;
        let mut rows = statement.query([]).map_err(upstream)?;
        while let Some(row) = rows.next().map_err(upstream)? {
            let record = decode(row).map_err(|err| ExportError::upstream(kind, err))?;
            visitor(record)?;
        }
        Ok(())
    }
}

impl RowSource for SqliteRowSource<'_> {
    fn visit_points(&self, visitor: &mut Visitor<'_, PointRecord>) -> Result<(), ExportError> {
        self.visit_rows(
            RecordKind::Node,
            NODES_TABLE,
            "id, action, lat, lon, tags",
            decode_point,
            visitor,
        )
    }

    fn visit_ways(&self, visitor: &mut Visitor<'_, WayRecord>) -> Result<(), ExportError> {
        self.visit_rows(
            RecordKind::Way,
            WAYS_TABLE,
            "id, action, node_refs, tags",
            decode_way,
            visitor,
        )
    }

    fn visit_relations(
        &self,
        visitor: &mut Visitor<'_, RelationRecord>,
    ) -> Result<(), ExportError> {
        self.visit_rows(
            RecordKind::Relation,
            RELATIONS_TABLE,
            "id, action, members, tags",
            decode_relation,
            visitor,
        )
    }
}

fn column<T: rusqlite::types::FromSql>(
    row: &Row<'_>,
    table: &'static str,
    index: usize,
) -> Result<T, SqliteRowSourceError> {
    row.get(index)
        .map_err(|source| SqliteRowSourceError::Query { table, source })
}

fn decoded<T>(
    table: &'static str,
    id: i64,
    result: Result<T, EncodingError>,
) -> Result<T, SqliteRowSourceError> {
    result.map_err(|source| SqliteRowSourceError::Decode { table, id, source })
}

fn decode_point(row: &Row<'_>) -> Result<PointRecord, SqliteRowSourceError> {
    let id: i64 = column(row, NODES_TABLE, 0)?;
    let action: String = column(row, NODES_TABLE, 1)?;
    let lat: f64 = column(row, NODES_TABLE, 2)?;
    let lon: f64 = column(row, NODES_TABLE, 3)?;
    let tags: Option<String> = column(row, NODES_TABLE, 4)?;
    let tags = decoded(NODES_TABLE, id, decode_pairs("tags", tags.as_deref()))?;
    Ok(PointRecord::new(id, action, lat, lon, tags))
}

fn decode_way(row: &Row<'_>) -> Result<WayRecord, SqliteRowSourceError> {
    let id: i64 = column(row, WAYS_TABLE, 0)?;
    let action: String = column(row, WAYS_TABLE, 1)?;
    let node_refs: Option<String> = column(row, WAYS_TABLE, 2)?;
    let tags: Option<String> = column(row, WAYS_TABLE, 3)?;
    Ok(WayRecord {
        id,
        action,
        node_refs: decoded(WAYS_TABLE, id, decode_node_refs(node_refs.as_deref()))?,
        tags: decoded(WAYS_TABLE, id, decode_pairs("tags", tags.as_deref()))?,
    })
}

fn decode_relation(row: &Row<'_>) -> Result<RelationRecord, SqliteRowSourceError> {
    let id: i64 = column(row, RELATIONS_TABLE, 0)?;
    let action: String = column(row, RELATIONS_TABLE, 1)?;
    let members: Option<String> = column(row, RELATIONS_TABLE, 2)?;
    let tags: Option<String> = column(row, RELATIONS_TABLE, 3)?;
    Ok(RelationRecord {
        id,
        action,
        members: decoded(RELATIONS_TABLE, id, decode_pairs("members", members.as_deref()))?,
        tags: decoded(RELATIONS_TABLE, id, decode_pairs("tags", tags.as_deref()))?,
    })
}

/// Create the normalised tables and the header configuration table when
/// missing.
///
/// The conversion script normally creates these; the helper exists for
/// fixtures and for build-environment scripts that want a known layout.
pub fn create_export_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS osm_nodes (
            id INTEGER NOT NULL,
            action TEXT NOT NULL,
            lat REAL NOT NULL,
            lon REAL NOT NULL,
            tags TEXT
        );
        CREATE TABLE IF NOT EXISTS osm_ways (
            id INTEGER NOT NULL,
            action TEXT NOT NULL,
            node_refs TEXT,
            tags TEXT
        );
        CREATE TABLE IF NOT EXISTS osm_relations (
            id INTEGER NOT NULL,
            action TEXT NOT NULL,
            members TEXT,
            tags TEXT
        );
        CREATE TABLE IF NOT EXISTS osm_file_config (
            version TEXT,
            download TEXT,
            upload TEXT,
            locked TEXT,
            generator TEXT
        );",
    )
}
