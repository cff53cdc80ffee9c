//! File-backed planning tests: schema models round-trip through JSON
//! files the way the binary consumes them.

use std::fs;
use std::path::PathBuf;

use sqldrift_cli::{dialect_by_name, load_database, plan_changes, plan_script};
use sqldrift_core::{Column, Database, Table, TypeCode};

fn write_schema(dir: &tempfile::TempDir, name: &str, db: &Database) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(db).unwrap()).unwrap();
    path
}

fn current() -> Database {
    Database::new("app").table(
        Table::new("users").column(Column::new("id", TypeCode::Bigint).primary_key()),
    )
}

fn desired() -> Database {
    Database::new("app").table(
        Table::new("users")
            .column(Column::new("id", TypeCode::Bigint).primary_key())
            .column(Column::new("email", TypeCode::Varchar(255))),
    )
}

#[test]
fn schema_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_schema(&dir, "current.json", &current());
    let loaded = load_database(&path).unwrap();
    assert_eq!(loaded, current());
}

#[test]
fn plan_produces_dialect_sql_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let current_path = write_schema(&dir, "current.json", &current());
    let desired_path = write_schema(&dir, "desired.json", &desired());

    let dialect = dialect_by_name("derby", false).unwrap();
    let current = load_database(&current_path).unwrap();
    let desired = load_database(&desired_path).unwrap();

    let script = plan_script(&current, &desired, dialect.as_ref()).unwrap();
    assert_eq!(
        script.statements(),
        ["ALTER TABLE users ADD COLUMN email VARCHAR(255)"]
    );
}

#[test]
fn diff_lists_changes() {
    let dialect = dialect_by_name("firebird", false).unwrap();
    let changes = plan_changes(&current(), &desired(), dialect.as_ref()).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].to_string(), "add column users.email");
}

#[test]
fn in_sync_schemas_plan_nothing() {
    let dialect = dialect_by_name("derby", false).unwrap();
    let script = plan_script(&current(), &current(), dialect.as_ref()).unwrap();
    assert!(script.is_empty());
}

#[test]
fn unknown_dialect_is_rejected() {
    let err = dialect_by_name("oracle9", false).unwrap_err();
    assert!(err.to_string().contains("unknown dialect"));
}

#[test]
fn missing_schema_file_reports_path() {
    let err = load_database(std::path::Path::new("/nonexistent/schema.json")).unwrap_err();
    assert!(err.to_string().contains("schema.json"));
}
