//! SQL script stages run around the export.
//!
//! Each stage is backed by one file in the scripts directory. The build
//! stage also runs every `*.sql` file in `build_environment/`, in file name
//! order, after its own file. Scripts may reference the export target through `{{database}}`, `{{schema}}` and
//! `{{table}}`, which are substituted as quoted SQL identifiers before the
//! batch runs.
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use rusqlite::Connection;
use thiserror::Error;

use crate::TableTarget;

/// Pipeline stages backed by SQL scripts, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptStage {
    /// Prepare helper tables and functions.
    BuildEnvironment,
    /// Record per-table configuration such as the header row.
    UpdateTableConfig,
    /// Populate the normalised point, way and relation tables.
    ConvertTable,
    /// Drop everything the other stages created.
    DemolishEnvironment,
}

impl ScriptStage {
    /// Stages that run before the document is written.
    pub const SETUP: [Self; 3] = [
        Self::BuildEnvironment,
        Self::UpdateTableConfig,
        Self::ConvertTable,
    ];

    /// Script file name inside the scripts directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::BuildEnvironment => "build_environment.sql",
            Self::UpdateTableConfig => "update_table_config.sql",
            Self::ConvertTable => "convert_table_to_osm_structure.sql",
            Self::DemolishEnvironment => "demolish_environment.sql",
        }
    }

    /// Directory of additional scripts run after the stage file, if any.
    pub const fn directory_name(self) -> Option<&'static str> {
        match self {
            Self::BuildEnvironment => Some("build_environment"),
            _ => None,
        }
    }

    /// Whether a missing script aborts the pipeline.
    pub const fn is_required(self) -> bool {
        matches!(self, Self::ConvertTable)
    }
}

impl fmt::Display for ScriptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuildEnvironment => "build environment",
            Self::UpdateTableConfig => "update table config",
            Self::ConvertTable => "convert table",
            Self::DemolishEnvironment => "demolish environment",
        };
        f.write_str(name)
    }
}

/// What happened when a stage was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// This many scripts were found and executed.
    Ran(usize),
    /// The optional script was absent.
    Skipped,
}

/// Errors raised while running a script stage.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A required script is missing.
    #[error("required {stage} script not found at {path}")]
    Missing {
        /// Stage whose script is missing.
        stage: ScriptStage,
        /// Expected location.
        path: Utf8PathBuf,
    },
    /// The script could not be inspected or read.
    #[error("failed to read {stage} script at {path}")]
    Read {
        /// Stage being prepared.
        stage: ScriptStage,
        /// Script location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// SQLite rejected the script.
    #[error("{stage} script at {path} failed")]
    Execute {
        /// Stage being run.
        stage: ScriptStage,
        /// Script location.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Runs stage scripts from a directory.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    scripts_dir: Utf8PathBuf,
}

impl ScriptRunner {
    /// Use scripts from `scripts_dir`.
    pub fn new(scripts_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    /// Directory scripts are read from.
    pub fn scripts_dir(&self) -> &Utf8Path {
        &self.scripts_dir
    }

    /// Location of the script backing `stage`.
    pub fn script_path(&self, stage: ScriptStage) -> Utf8PathBuf {
        self.scripts_dir.join(stage.file_name())
    }

    /// Scripts backing `stage`, in execution order.
    ///
    /// A missing required script is an error. Missing optional scripts are
    /// left out of the list.
    pub fn stage_scripts(&self, stage: ScriptStage) -> Result<Vec<Utf8PathBuf>, ScriptError> {
        let path = self.script_path(stage);
        let found = osm_export_fs::is_file(&path).map_err(|source| ScriptError::Read {
            stage,
            path: path.clone(),
            source,
        })?;
        if !found && stage.is_required() {
            return Err(ScriptError::Missing { stage, path });
        }
        let mut scripts = Vec::new();
        if found {
            scripts.push(path);
        }
        if let Some(name) = stage.directory_name() {
            let dir = self.scripts_dir.join(name);
            let extra = osm_export_fs::files_with_extension(&dir, "sql")
                .map_err(|source| ScriptError::Read {
                    stage,
                    path: dir,
                    source,
                })?;
            scripts.extend(extra);
        }
        Ok(scripts)
    }

    /// Run the scripts for `stage` against `connection`.
    ///
    /// # Examples
    /// ```
    /// use osm_export_data::{ScriptRunner, ScriptStage, StageOutcome, TableTarget};
    /// use rusqlite::Connection;
    ///
    /// let connection = Connection::open_in_memory().expect("in-memory database");
    /// let target: TableTarget = "gis.public.parks".parse().expect("valid target");
    /// let runner = ScriptRunner::new("/nonexistent-scripts");
    /// let outcome = runner
    ///     .run(&connection, ScriptStage::BuildEnvironment, &target)
    ///     .expect("optional stage");
    /// assert_eq!(outcome, StageOutcome::Skipped);
    /// ```
    pub fn run(
        &self,
        connection: &Connection,
        stage: ScriptStage,
        target: &TableTarget,
    ) -> Result<StageOutcome, ScriptError> {
        let scripts = self.stage_scripts(stage)?;
        if scripts.is_empty() {
            debug!("Skipping {stage}: no script under {}", self.scripts_dir);
            return Ok(StageOutcome::Skipped);
        }
        for path in &scripts {
            run_script(connection, stage, path, target)?;
        }
        Ok(StageOutcome::Ran(scripts.len()))
    }
}

fn run_script(
    connection: &Connection,
    stage: ScriptStage,
    path: &Utf8Path,
    target: &TableTarget,
) -> Result<(), ScriptError> {
    let script = osm_export_fs::read_to_string(path).map_err(|source| ScriptError::Read {
        stage,
        path: path.to_path_buf(),
        source,
    })?;
    connection
        .execute_batch(&render_script(&script, target))
        .map_err(|source| ScriptError::Execute {
            stage,
            path: path.to_path_buf(),
            source,
        })?;
    info!("Ran {stage} script {path} for {target}");
    Ok(())
}

/// Substitute target placeholders with quoted identifiers.
pub fn render_script(script: &str, target: &TableTarget) -> String {
    script
        .replace("{{database}}", &quote_identifier(target.database()))
        .replace("{{schema}}", &quote_identifier(target.schema()))
        .replace("{{table}}", &quote_identifier(target.table()))
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
