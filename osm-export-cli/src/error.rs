//! Error types emitted by the `osm-export` CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use osm_export_data::{
    ExportFileError, RowOrderParseError, ScriptError, SqliteRowSourceError, TargetParseError,
};
use thiserror::Error;

/// Errors emitted by the `osm-export` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass it on the command line or set {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The export target is not of the form `database.schema.table`.
    #[error("invalid export target: {0}")]
    InvalidTarget(#[from] TargetParseError),
    /// The requested row order is unknown.
    #[error("invalid --row-order: {0}")]
    InvalidRowOrder(#[from] RowOrderParseError),
    /// The database file for the target does not exist.
    #[error("database {path:?} does not exist or is not a file")]
    MissingDatabase { path: Utf8PathBuf },
    /// A configured directory is missing where required, or is not a directory.
    #[error("{field} {path:?} is not an existing directory")]
    NotADirectory {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A configured path could not be inspected due to an IO error.
    #[error("failed to inspect {field} {path:?}: {source}")]
    InspectPath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the database failed.
    #[error(transparent)]
    OpenDatabase(SqliteRowSourceError),
    /// A script stage failed.
    #[error(transparent)]
    Script(#[from] ScriptError),
    /// Writing the configured header values failed.
    #[error("failed to write header configuration: {0}")]
    HeaderConfig(#[source] rusqlite::Error),
    /// Writing the document failed.
    #[error(transparent)]
    Export(#[from] ExportFileError),
    /// Reporting the output path failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
