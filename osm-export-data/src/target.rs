//! Export targets of the form `database.schema.table`.

use std::{fmt, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

const DATABASE_EXTENSION: &str = "sqlite";
const DOCUMENT_EXTENSION: &str = "osm";

/// Errors returned when parsing a [`TableTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    /// The argument did not split into exactly three dot-separated segments.
    #[error("expected database.schema.table, found {count} segment(s) in {raw:?}")]
    SegmentCount {
        /// Original argument.
        raw: String,
        /// Number of segments found.
        count: usize,
    },
    /// A segment was empty.
    #[error("the {segment} segment of {raw:?} is empty")]
    EmptySegment {
        /// Original argument.
        raw: String,
        /// Name of the empty segment.
        segment: &'static str,
    },
    /// A segment contains a path separator and could escape the data
    /// directories.
    #[error("the {segment} segment of {raw:?} contains a path separator")]
    PathSeparator {
        /// Original argument.
        raw: String,
        /// Name of the offending segment.
        segment: &'static str,
    },
}

/// The source table a document is exported for.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use osm_export_data::TableTarget;
///
/// let target: TableTarget = "gis.public.parks".parse().expect("valid target");
/// assert_eq!(target.database(), "gis");
/// assert_eq!(
///     target.output_path(Utf8Path::new("out")).as_str(),
///     "out/gis/public.parks.osm"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    database: String,
    schema: String,
    table: String,
}

impl TableTarget {
    /// Database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Schema name.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Location of the database file inside `database_dir`.
    pub fn database_path(&self, database_dir: &Utf8Path) -> Utf8PathBuf {
        database_dir.join(format!("{}.{DATABASE_EXTENSION}", self.database))
    }

    /// Location of the exported document: `<output_dir>/<database>/<schema>.<table>.osm`.
    pub fn output_path(&self, output_dir: &Utf8Path) -> Utf8PathBuf {
        output_dir
            .join(&self.database)
            .join(format!("{}.{}.{DOCUMENT_EXTENSION}", self.schema, self.table))
    }
}

impl FromStr for TableTarget {
    type Err = TargetParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = raw.split('.').collect();
        let [database, schema, table] = segments.as_slice() else {
            return Err(TargetParseError::SegmentCount {
                raw: raw.to_owned(),
                count: segments.len(),
            });
        };
        for (segment, value) in [("database", database), ("schema", schema), ("table", table)] {
            if value.trim().is_empty() {
                return Err(TargetParseError::EmptySegment {
                    raw: raw.to_owned(),
                    segment,
                });
            }
            if value.contains(['/', '\\']) {
                return Err(TargetParseError::PathSeparator {
                    raw: raw.to_owned(),
                    segment,
                });
            }
        }
        Ok(Self {
            database: (*database).to_owned(),
            schema: (*schema).to_owned(),
            table: (*table).to_owned(),
        })
    }
}

impl fmt::Display for TableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}
