//! Command-line interface for exporting converted tables as OSM XML.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod export;

pub use error::CliError;
use export::{ExportArgs, run_export};

const ARG_TARGET: &str = "target";
const ARG_DATABASE_DIR: &str = "database-dir";
const ARG_SCRIPTS_DIR: &str = "scripts-dir";
const ARG_OUTPUT_DIR: &str = "output-dir";
const ARG_ROW_ORDER: &str = "row-order";
const ARG_VERSION: &str = "version";
const ARG_DOWNLOAD: &str = "download";
const ARG_UPLOAD: &str = "upload";
const ARG_LOCKED: &str = "locked";
const ARG_GENERATOR: &str = "generator";
const ENV_TARGET: &str = "OSM_EXPORT_CMDS_EXPORT_TARGET";

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Export(args) => run_export(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "osm-export",
    about = "Export converted database tables as OSM XML documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert one table and write it as an OSM document.
    Export(ExportArgs),
}

#[cfg(test)]
mod tests;
