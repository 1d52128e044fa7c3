//! Export command implementation.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::io::Write;

use osm_export_core::{ExportSummary, HeaderRow};
use osm_export_data::{
    RowOrder, ScriptRunner, ScriptStage, SqliteRowSource, TableTarget, export_document_to_path,
    open_database, resolve_header, write_header_config,
};

use crate::{
    ARG_DATABASE_DIR, ARG_DOWNLOAD, ARG_GENERATOR, ARG_LOCKED, ARG_OUTPUT_DIR, ARG_ROW_ORDER,
    ARG_SCRIPTS_DIR, ARG_TARGET, ARG_UPLOAD, ARG_VERSION, CliError, ENV_TARGET,
};

const DEFAULT_DATABASE_DIR: &str = ".";
const DEFAULT_SCRIPTS_DIR: &str = "sql";
const DEFAULT_OUTPUT_DIR: &str = "output";

/// CLI arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run the conversion scripts for one table, then stream the \
                 normalised nodes, ways and relations into \
                 <output-dir>/<database>/<schema>.<table>.osm. Directories \
                 can come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Export one table as an OSM XML document"
)]
#[ortho_config(prefix = "OSM_EXPORT")]
pub(crate) struct ExportArgs {
    /// Table to export, as database.schema.table.
    #[arg(value_name = "database.schema.table")]
    #[serde(default)]
    pub(crate) target: Option<String>,
    /// Directory holding `<database>.sqlite` files.
    #[arg(long = ARG_DATABASE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) database_dir: Option<Utf8PathBuf>,
    /// Directory holding the stage SQL scripts.
    #[arg(long = ARG_SCRIPTS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) scripts_dir: Option<Utf8PathBuf>,
    /// Root directory for exported documents.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Row order: `storage` (as stored) or `id` (ascending identifiers).
    #[arg(long = ARG_ROW_ORDER, value_name = "order")]
    #[serde(default)]
    pub(crate) row_order: Option<String>,
    /// Header `version` attribute, overriding the table configuration.
    #[arg(long = ARG_VERSION, value_name = "version")]
    #[serde(default)]
    pub(crate) version: Option<String>,
    /// Header `download` flag.
    #[arg(long = ARG_DOWNLOAD, value_name = "bool")]
    #[serde(default)]
    pub(crate) download: Option<bool>,
    /// Header `upload` flag.
    #[arg(long = ARG_UPLOAD, value_name = "bool")]
    #[serde(default)]
    pub(crate) upload: Option<bool>,
    /// Header `locked` flag.
    #[arg(long = ARG_LOCKED, value_name = "bool")]
    #[serde(default)]
    pub(crate) locked: Option<bool>,
    /// Header `generator` attribute.
    #[arg(long = ARG_GENERATOR, value_name = "name")]
    #[serde(default)]
    pub(crate) generator: Option<String>,
}

impl ExportArgs {
    pub(crate) fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExportConfig::try_from(merged)
    }
}

/// Resolved `export` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportConfig {
    pub(crate) target: TableTarget,
    pub(crate) database_dir: Utf8PathBuf,
    pub(crate) scripts_dir: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) row_order: RowOrder,
    /// Header values written over the table configuration; unset fields are
    /// left to the scripts.
    pub(crate) header: HeaderRow,
}

impl ExportConfig {
    pub(crate) fn database_path(&self) -> Utf8PathBuf {
        self.target.database_path(&self.database_dir)
    }

    pub(crate) fn output_path(&self) -> Utf8PathBuf {
        self.target.output_path(&self.output_dir)
    }

    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        let database = self.database_path();
        if !inspect(&database, ARG_DATABASE_DIR, osm_export_fs::is_file)? {
            return Err(CliError::MissingDatabase { path: database });
        }
        // The conversion script is mandatory, so its directory must exist.
        if !inspect(&self.scripts_dir, ARG_SCRIPTS_DIR, osm_export_fs::is_dir)? {
            return Err(Self::not_a_directory(&self.scripts_dir, ARG_SCRIPTS_DIR));
        }
        // A missing output directory is created on export.
        if inspect(&self.output_dir, ARG_OUTPUT_DIR, osm_export_fs::is_file)? {
            return Err(Self::not_a_directory(&self.output_dir, ARG_OUTPUT_DIR));
        }
        Ok(())
    }

    fn not_a_directory(path: &Utf8Path, field: &'static str) -> CliError {
        CliError::NotADirectory {
            field,
            path: path.to_path_buf(),
        }
    }
}

fn inspect(
    path: &Utf8Path,
    field: &'static str,
    check: fn(&Utf8Path) -> std::io::Result<bool>,
) -> Result<bool, CliError> {
    check(path).map_err(|source| CliError::InspectPath {
        field,
        path: path.to_path_buf(),
        source,
    })
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = CliError;

    fn try_from(args: ExportArgs) -> Result<Self, Self::Error> {
        let raw_target = args.target.ok_or(CliError::MissingArgument {
            field: ARG_TARGET,
            env: ENV_TARGET,
        })?;
        let target = raw_target.parse::<TableTarget>()?;
        let row_order = args
            .row_order
            .as_deref()
            .map(str::parse::<RowOrder>)
            .transpose()?
            .unwrap_or_default();
        let header = HeaderRow {
            version: args.version,
            download: args.download.map(|flag| flag.to_string()),
            upload: args.upload.map(|flag| flag.to_string()),
            locked: args.locked.map(|flag| flag.to_string()),
            generator: args.generator,
        };
        Ok(Self {
            target,
            database_dir: args
                .database_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE_DIR)),
            scripts_dir: args
                .scripts_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SCRIPTS_DIR)),
            output_dir: args
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            row_order,
            header,
        })
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportOutcome {
    pub(crate) path: Utf8PathBuf,
    pub(crate) summary: ExportSummary,
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_export_with(args, &mut stdout)
}

pub(crate) fn run_export_with(args: ExportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let outcome = execute_export(&config)?;
    writeln!(writer, "{}", outcome.path).map_err(CliError::WriteOutput)
}

/// Run every stage for `config.target` and write the document.
///
/// The teardown script runs whether or not the earlier stages succeeded.
/// When both fail, the earlier error is returned.
pub(crate) fn execute_export(config: &ExportConfig) -> Result<ExportOutcome, CliError> {
    let connection = open_database(&config.database_path()).map_err(CliError::OpenDatabase)?;
    let runner = ScriptRunner::new(config.scripts_dir.clone());

    let exported = prepare_and_export(config, &connection, &runner);
    let teardown = runner
        .run(&connection, ScriptStage::DemolishEnvironment, &config.target)
        .map_err(CliError::Script);

    if let (Err(_), Err(err)) = (&exported, &teardown) {
        warn!("Teardown for {} also failed: {err}", config.target);
    }
    let outcome = exported?;
    teardown?;
    info!(
        "Exported {} to {} ({} nodes, {} ways, {} relations)",
        config.target,
        outcome.path,
        outcome.summary.nodes,
        outcome.summary.ways,
        outcome.summary.relations
    );
    Ok(outcome)
}

fn prepare_and_export(
    config: &ExportConfig,
    connection: &Connection,
    runner: &ScriptRunner,
) -> Result<ExportOutcome, CliError> {
    for stage in ScriptStage::SETUP {
        runner.run(connection, stage, &config.target)?;
        if stage == ScriptStage::UpdateTableConfig {
            write_header_config(connection, &config.header).map_err(CliError::HeaderConfig)?;
        }
    }
    let header = resolve_header(connection);
    let source = SqliteRowSource::new(connection, config.row_order);
    let path = config.output_path();
    let summary = export_document_to_path(&header, &source, &path)?;
    Ok(ExportOutcome { path, summary })
}
