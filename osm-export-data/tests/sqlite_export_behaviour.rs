//! Behavioural tests wiring scripts, the SQLite row source and file export.

use std::{cell::RefCell, fs, path::PathBuf};

use camino::Utf8PathBuf;
use osm_export_core::{ExportError, RecordKind};
use osm_export_data::{
    ExportFileError, RowOrder, ScriptError, ScriptRunner, ScriptStage, SqliteRowSource,
    TableTarget, export_document_to_path, open_database, resolve_header,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rusqlite::Connection;
use tempfile::TempDir;

const CONVERT_SCRIPT: &str = r#"
CREATE TABLE osm_nodes (id INTEGER, action TEXT, lat REAL, lon REAL, tags TEXT);
CREATE TABLE osm_ways (id INTEGER, action TEXT, node_refs TEXT, tags TEXT);
CREATE TABLE osm_relations (id INTEGER, action TEXT, members TEXT, tags TEXT);
INSERT INTO osm_nodes
    SELECT id, 'modify', lat, lon, json_array(json_array('name', name)) FROM {{table}};
INSERT INTO osm_ways VALUES (100, 'modify', '[1, 1]', NULL);
"#;

const LOCK_SCRIPT: &str = r#"
CREATE TABLE osm_file_config (version TEXT, download TEXT, upload TEXT, locked TEXT, generator TEXT);
INSERT INTO osm_file_config VALUES ('0.6', 'true', 'true', 'yes', 'parks_export');
"#;

const MALFORMED_SCRIPT: &str = r#"
CREATE TABLE osm_nodes (id INTEGER, action TEXT, lat REAL, lon REAL, tags TEXT);
CREATE TABLE osm_ways (id INTEGER, action TEXT, node_refs TEXT, tags TEXT);
CREATE TABLE osm_relations (id INTEGER, action TEXT, members TEXT, tags TEXT);
INSERT INTO osm_nodes VALUES (1, 'modify', 0.0, 0.0, 'not json');
"#;

struct ExportWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    outcome: RefCell<Option<Result<Utf8PathBuf, String>>>,
    failure: RefCell<Option<Failure>>,
}

#[derive(Debug)]
enum Failure {
    Script(ScriptError),
    Export(ExportFileError),
}

impl ExportWorld {
    fn scripts_dir(&self) -> Utf8PathBuf {
        self.root.join("sql")
    }

    fn output_dir(&self) -> Utf8PathBuf {
        self.root.join("output")
    }

    fn write_script(&self, stage: ScriptStage, body: &str) {
        let dir = self.scripts_dir();
        fs::create_dir_all(&dir).expect("create scripts dir");
        fs::write(dir.join(stage.file_name()), body).expect("write script");
    }

    fn target() -> TableTarget {
        "gis.public.parks".parse().expect("valid target")
    }

    fn output_path(&self) -> Utf8PathBuf {
        Self::target().output_path(&self.output_dir())
    }

    fn document(&self) -> String {
        let borrowed = self.outcome.borrow();
        let path = match borrowed.as_ref().expect("export was attempted") {
            Ok(path) => path.clone(),
            Err(err) => panic!("expected a document, got {err}"),
        };
        fs::read_to_string(path).expect("read document")
    }

    fn take_failure(&self) -> Failure {
        self.failure.borrow_mut().take().expect("export failed")
    }
}

#[fixture]
fn world() -> ExportWorld {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    ExportWorld {
        _dir: dir,
        root,
        outcome: RefCell::new(None),
        failure: RefCell::new(None),
    }
}

fn export(world: &ExportWorld, connection: &Connection) -> Result<Utf8PathBuf, Failure> {
    let target = ExportWorld::target();
    let runner = ScriptRunner::new(world.scripts_dir());
    for stage in ScriptStage::SETUP {
        runner
            .run(connection, stage, &target)
            .map_err(Failure::Script)?;
    }
    let header = resolve_header(connection);
    let source = SqliteRowSource::new(connection, RowOrder::Id);
    let path = world.output_path();
    export_document_to_path(&header, &source, &path).map_err(Failure::Export)?;
    Ok(path)
}

#[given("a scripts directory that converts gis.public.parks")]
fn converting_scripts(world: &ExportWorld) {
    world.write_script(ScriptStage::ConvertTable, CONVERT_SCRIPT);
}

#[given("a scripts directory that locks the document")]
fn locking_scripts(world: &ExportWorld) {
    world.write_script(ScriptStage::UpdateTableConfig, LOCK_SCRIPT);
}

#[given("a scripts directory that writes a malformed tag column")]
fn malformed_scripts(world: &ExportWorld) {
    world.write_script(ScriptStage::ConvertTable, MALFORMED_SCRIPT);
}

#[given("an empty scripts directory")]
fn empty_scripts(world: &ExportWorld) {
    fs::create_dir_all(world.scripts_dir()).expect("create scripts dir");
}

#[given("a database named gis")]
fn database(world: &ExportWorld) {
    let path = ExportWorld::target().database_path(&world.root);
    let connection = Connection::open(&path).expect("create database");
    connection
        .execute_batch(
            "CREATE TABLE parks (id INTEGER, name TEXT, lat REAL, lon REAL);
             INSERT INTO parks VALUES (1, 'Hyde & Green', 51.5, -0.1);",
        )
        .expect("seed source table");
}

#[when("I export gis.public.parks")]
fn export_target(world: &ExportWorld) {
    let path = ExportWorld::target().database_path(&world.root);
    let connection = open_database(&path).expect("open database");
    match export(world, &connection) {
        Ok(path) => {
            world.outcome.replace(Some(Ok(path)));
        }
        Err(failure) => {
            world.outcome.replace(Some(Err(format!("{failure:?}"))));
            world.failure.replace(Some(failure));
        }
    }
}

#[then("the output file holds one node and one way")]
fn node_and_way(world: &ExportWorld) {
    let document = world.document();
    assert!(document.contains("  <node id='1' action='modify' lat='51.5' lon='-0.1'>\n"));
    assert!(document.contains("    <tag k='name' v='Hyde &amp; Green' />\n"));
    assert!(document.contains("  <way id='100' action='modify'>\n"));
    assert_eq!(document.matches("<nd ref='1' />").count(), 2);
    assert!(document.ends_with("</osm>\n"));
}

#[then("no staging files remain in the output directory")]
fn no_staging_files(world: &ExportWorld) {
    let dir = world.output_dir().join("gis");
    let names: Vec<String> = fs::read_dir(&dir)
        .expect("list output dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec!["public.parks.osm".to_owned()]);
}

#[then("the root element is locked")]
fn locked_root(world: &ExportWorld) {
    let document = world.document();
    let root = document.lines().nth(1).expect("root element");
    assert_eq!(
        root,
        "<osm version='0.6' download='true' upload='true' locked='true' generator='parks_export'>"
    );
}

#[then("the export fails for the missing conversion script")]
fn missing_script(world: &ExportWorld) {
    match world.take_failure() {
        Failure::Script(ScriptError::Missing { stage, path }) => {
            assert_eq!(stage, ScriptStage::ConvertTable);
            assert_eq!(
                path.file_name(),
                Some("convert_table_to_osm_structure.sql")
            );
        }
        other => panic!("expected a missing script, got {other:?}"),
    }
}

#[then("the export fails while reading nodes")]
fn failed_nodes(world: &ExportWorld) {
    match world.take_failure() {
        Failure::Export(ExportFileError::Export {
            source: ExportError::Upstream { kind, .. },
            ..
        }) => assert_eq!(kind, RecordKind::Node),
        other => panic!("expected an upstream node failure, got {other:?}"),
    }
}

#[then("no output file exists")]
fn no_output(world: &ExportWorld) {
    assert!(!world.output_path().exists());
}

#[scenario(path = "tests/features/sqlite_export.feature", index = 0)]
fn converted_table_scenario(world: ExportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_export.feature", index = 1)]
fn header_configuration_scenario(world: ExportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_export.feature", index = 2)]
fn missing_conversion_script_scenario(world: ExportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_export.feature", index = 3)]
fn malformed_rows_scenario(world: ExportWorld) {
    let _ = world;
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/sqlite_export.feature");
    let contents = fs::read_to_string(&feature)
        .unwrap_or_else(|err| panic!("failed to read feature file {feature:?}: {err}"));
    let titles: Vec<String> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .map(|title| title.to_owned())
        .collect();
    let expected = [
        "A converted table is written to its output path",
        "Header configuration written by a script reaches the root element",
        "A missing conversion script aborts before any output",
        "Rows that do not decode abort the export",
    ];
    assert_eq!(
        titles.len(),
        expected.len(),
        "scenario count changed in feature file: {titles:?}"
    );
    for (index, expected_title) in expected.iter().enumerate() {
        let actual = titles.get(index).map(String::as_str);
        assert_eq!(
            actual,
            Some(*expected_title),
            "scenario at index {index} does not match feature order"
        );
    }
}
