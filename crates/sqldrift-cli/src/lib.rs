//! Library surface of the `sqldrift` command-line tool.
//!
//! Schema models travel as JSON files (the serde form of
//! [`Database`]); the functions here load them, run the differ and the
//! emission engine, and hand the result back to the binary (or to
//! tests, which call them directly instead of spawning the binary).

use std::path::Path;

use anyhow::Context;

use sqldrift_core::{diff_database, Change, Database, DdlEmitter, Dialect, SqlScript};
use sqldrift_derby::DerbyDialect;
use sqldrift_firebird::FirebirdDialect;

/// Names of the supported dialects.
pub const DIALECTS: &[&str] = &["derby", "firebird"];

/// Resolves a dialect strategy by name.
pub fn dialect_by_name(name: &str, delimited: bool) -> anyhow::Result<Box<dyn Dialect>> {
    match name {
        "derby" => Ok(Box::new(DerbyDialect::with_delimited_identifiers(delimited))),
        "firebird" => Ok(Box::new(FirebirdDialect::with_delimited_identifiers(
            delimited,
        ))),
        other => anyhow::bail!(
            "unknown dialect `{other}` (expected one of: {})",
            DIALECTS.join(", ")
        ),
    }
}

/// Loads a database model from a JSON schema file.
pub fn load_database(path: &Path) -> anyhow::Result<Database> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema file {}", path.display()))?;
    let database = serde_json::from_str(&data)
        .with_context(|| format!("parsing schema file {}", path.display()))?;
    Ok(database)
}

/// Computes the change set between two models under the dialect's
/// identifier mode.
pub fn plan_changes(
    current: &Database,
    desired: &Database,
    dialect: &dyn Dialect,
) -> anyhow::Result<Vec<Change>> {
    let changes = diff_database(current, desired, dialect.delimited_identifiers())?;
    Ok(changes)
}

/// Diffs the two models and compiles the full DDL script.
pub fn plan_script(
    current: &Database,
    desired: &Database,
    dialect: &dyn Dialect,
) -> anyhow::Result<SqlScript> {
    let changes = diff_database(current, desired, dialect.delimited_identifiers())?;
    let mut tracked = current.clone();
    let script = DdlEmitter::new(dialect).emit(&mut tracked, desired, changes)?;
    Ok(script)
}
