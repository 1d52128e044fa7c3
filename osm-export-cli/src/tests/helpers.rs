//! Test helpers for building a database and scripts directory on disk.

use super::*;
use camino::Utf8PathBuf;
use osm_export_data::ScriptStage;
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

pub(super) const TARGET: &str = "gis.public.parks";

pub(super) const CONVERT_SCRIPT: &str = r#"
CREATE TABLE osm_nodes (id INTEGER, action TEXT, lat REAL, lon REAL, tags TEXT);
CREATE TABLE osm_ways (id INTEGER, action TEXT, node_refs TEXT, tags TEXT);
CREATE TABLE osm_relations (id INTEGER, action TEXT, members TEXT, tags TEXT);
INSERT INTO osm_nodes
    SELECT id, 'modify', lat, lon, json_array(json_array('name', name)) FROM {{table}};
INSERT INTO osm_ways VALUES (10, 'modify', '[2, 1]', '[["highway","footway"]]');
INSERT INTO osm_relations
    VALUES (20, 'modify', '[["type","way"],["ref",10],["role","outer"]]', NULL);
"#;

pub(super) const DEMOLISH_SCRIPT: &str = r"
DROP TABLE IF EXISTS osm_nodes;
DROP TABLE IF EXISTS osm_ways;
DROP TABLE IF EXISTS osm_relations;
CREATE TABLE IF NOT EXISTS teardown_marker (ran INTEGER);
";

/// A temporary working tree with `databases/`, `sql/` and `output/`.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        fs::create_dir_all(root.join("databases")).expect("create database dir");
        fs::create_dir_all(root.join("sql")).expect("create scripts dir");
        Self { _dir: dir, root }
    }

    pub(super) fn database_dir(&self) -> Utf8PathBuf {
        self.root.join("databases")
    }

    pub(super) fn scripts_dir(&self) -> Utf8PathBuf {
        self.root.join("sql")
    }

    pub(super) fn output_dir(&self) -> Utf8PathBuf {
        self.root.join("output")
    }

    pub(super) fn database_path(&self) -> Utf8PathBuf {
        self.database_dir().join("gis.sqlite")
    }

    pub(super) fn seed_database(&self) {
        let connection = Connection::open(self.database_path()).expect("create database");
        connection
            .execute_batch(
                "CREATE TABLE parks (id INTEGER, name TEXT, lat REAL, lon REAL);
                 INSERT INTO parks VALUES (2, 'North <Lawn>', 52.0, 0.5);
                 INSERT INTO parks VALUES (1, 'South Lawn', 51.5, -0.1);",
            )
            .expect("seed parks table");
    }

    pub(super) fn write_script(&self, stage: ScriptStage, body: &str) {
        fs::write(self.scripts_dir().join(stage.file_name()), body).expect("write script");
    }

    pub(super) fn standard_scripts(&self) {
        self.write_script(ScriptStage::ConvertTable, CONVERT_SCRIPT);
        self.write_script(ScriptStage::DemolishEnvironment, DEMOLISH_SCRIPT);
    }

    pub(super) fn config(&self) -> ExportConfig {
        ExportConfig::try_from(self.args()).expect("valid arguments")
    }

    pub(super) fn args(&self) -> ExportArgs {
        ExportArgs {
            target: Some(TARGET.to_owned()),
            database_dir: Some(self.database_dir()),
            scripts_dir: Some(self.scripts_dir()),
            output_dir: Some(self.output_dir()),
            row_order: Some("id".to_owned()),
            ..ExportArgs::default()
        }
    }

    pub(super) fn table_exists(&self, table: &str) -> bool {
        let connection = Connection::open(self.database_path()).expect("open database");
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        count > 0
    }
}
