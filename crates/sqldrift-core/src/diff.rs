//! Schema differ.
//!
//! Compares a current and a desired [`Database`] model and produces the
//! ordered change set that transforms one into the other. Applying the
//! full change set to the current model yields a model structurally
//! equal to the desired one; that is the correctness contract the
//! emission engine relies on.

use tracing::debug;

use crate::change::{
    AddColumnChange, AddForeignKeyChange, AddIndexChange, AddPrimaryKeyChange, AddTableChange,
    Change, ModifyColumnChange, RemoveColumnChange, RemoveForeignKeyChange, RemoveIndexChange,
    RemovePrimaryKeyChange, RemoveTableChange,
};
use crate::error::{DriftError, Result};
use crate::model::{names_match, Database, ForeignKey, Index, Table};

/// Compares two database models and returns the ordered change set.
///
/// Ordering policy: table additions first, then per existing table its
/// column changes followed by its key/index changes, then table removals
/// last — newly added tables exist before keys reference them, and
/// removals cannot leave dangling references.
pub fn diff_database(current: &Database, desired: &Database, delimited: bool) -> Result<Vec<Change>> {
    validate_model(current, delimited)?;
    validate_model(desired, delimited)?;

    let mut changes = Vec::new();

    for table in &desired.tables {
        if current.find_table(&table.name, delimited).is_none() {
            changes.push(Change::AddTable(AddTableChange {
                table: table.clone(),
            }));
        }
    }

    for table in &current.tables {
        if let Some(target) = desired.find_table(&table.name, delimited) {
            diff_table(table, target, delimited, &mut changes);
        }
    }

    for table in &current.tables {
        if desired.find_table(&table.name, delimited).is_none() {
            changes.push(Change::RemoveTable(RemoveTableChange {
                table: table.clone(),
            }));
        }
    }

    debug!(changes = changes.len(), "schema diff complete");
    Ok(changes)
}

/// Diffs one table present in both models. Column changes come first
/// (adds in desired order, then modifies, then removes), the primary-key
/// pair next, then foreign-key and index changes (removes before adds).
fn diff_table(current: &Table, desired: &Table, delimited: bool, changes: &mut Vec<Change>) {
    let table = current.name.clone();

    for (position, column) in desired.columns.iter().enumerate() {
        if current.find_column(&column.name, delimited).is_none() {
            let insert_after = if position == 0 {
                None
            } else {
                Some(desired.columns[position - 1].name.clone())
            };
            changes.push(Change::AddColumn(AddColumnChange {
                table: table.clone(),
                column: column.clone(),
                insert_after,
                at_end: position == desired.columns.len() - 1,
            }));
        }
    }

    for column in &desired.columns {
        if let Some(old) = current.find_column(&column.name, delimited) {
            let differs = old.type_code != column.type_code
                || old.nullable != column.nullable
                || old.default != column.default
                || old.auto_increment != column.auto_increment;
            if differs {
                changes.push(Change::ModifyColumn(ModifyColumnChange {
                    table: table.clone(),
                    old_column: old.clone(),
                    new_column: column.clone(),
                }));
            }
        }
    }

    for column in &current.columns {
        if desired.find_column(&column.name, delimited).is_none() {
            changes.push(Change::RemoveColumn(RemoveColumnChange {
                table: table.clone(),
                column: column.clone(),
            }));
        }
    }

    diff_primary_key(current, desired, delimited, &table, changes);

    for fk in &current.foreign_keys {
        let survives = desired
            .foreign_keys
            .iter()
            .any(|other| foreign_keys_equal(fk, other, delimited));
        if !survives {
            changes.push(Change::RemoveForeignKey(RemoveForeignKeyChange {
                table: table.clone(),
                foreign_key: fk.clone(),
            }));
        }
    }
    for fk in &desired.foreign_keys {
        let exists = current
            .foreign_keys
            .iter()
            .any(|other| foreign_keys_equal(other, fk, delimited));
        if !exists {
            changes.push(Change::AddForeignKey(AddForeignKeyChange {
                table: table.clone(),
                foreign_key: fk.clone(),
            }));
        }
    }

    for index in &current.indexes {
        let survives = desired
            .indexes
            .iter()
            .any(|other| indexes_equal(index, other, delimited));
        if !survives {
            changes.push(Change::RemoveIndex(RemoveIndexChange {
                table: table.clone(),
                index: index.clone(),
            }));
        }
    }
    for index in &desired.indexes {
        let exists = current
            .indexes
            .iter()
            .any(|other| indexes_equal(other, index, delimited));
        if !exists {
            changes.push(Change::AddIndex(AddIndexChange {
                table: table.clone(),
                index: index.clone(),
            }));
        }
    }
}

/// Primary-key set changes are always emitted as a Remove/Add pair so
/// the table never passes through a state with a partial key.
fn diff_primary_key(
    current: &Table,
    desired: &Table,
    delimited: bool,
    table: &str,
    changes: &mut Vec<Change>,
) {
    let current_pk: Vec<&str> = current
        .primary_key_columns()
        .map(|column| column.name.as_str())
        .collect();
    let desired_pk: Vec<&str> = desired
        .primary_key_columns()
        .map(|column| column.name.as_str())
        .collect();

    let unchanged = current_pk.len() == desired_pk.len()
        && current_pk
            .iter()
            .zip(&desired_pk)
            .all(|(a, b)| names_match(a, b, delimited));
    if unchanged {
        return;
    }

    if !current_pk.is_empty() {
        changes.push(Change::RemovePrimaryKey(RemovePrimaryKeyChange {
            table: table.to_string(),
        }));
    }
    if !desired_pk.is_empty() {
        changes.push(Change::AddPrimaryKey(AddPrimaryKeyChange {
            table: table.to_string(),
            columns: desired_pk.iter().map(ToString::to_string).collect(),
        }));
    }
}

/// Foreign keys are identified by name plus full definition equality.
fn foreign_keys_equal(a: &ForeignKey, b: &ForeignKey, delimited: bool) -> bool {
    names_match(&a.name, &b.name, delimited)
        && names_match(&a.referenced_table, &b.referenced_table, delimited)
        && a.references.len() == b.references.len()
        && a.references.iter().zip(&b.references).all(|(x, y)| {
            names_match(&x.local, &y.local, delimited)
                && names_match(&x.referenced, &y.referenced, delimited)
        })
}

/// Indexes are identified by name plus full definition equality.
fn indexes_equal(a: &Index, b: &Index, delimited: bool) -> bool {
    names_match(&a.name, &b.name, delimited)
        && a.unique == b.unique
        && a.columns.len() == b.columns.len()
        && a.columns
            .iter()
            .zip(&b.columns)
            .all(|(x, y)| names_match(x, y, delimited))
}

/// Rejects models that violate internal invariants before any diffing
/// happens.
pub fn validate_model(db: &Database, delimited: bool) -> Result<()> {
    for (position, table) in db.tables.iter().enumerate() {
        if db.tables[position + 1..]
            .iter()
            .any(|other| names_match(&other.name, &table.name, delimited))
        {
            return Err(DriftError::AmbiguousIdentity {
                name: table.name.clone(),
                scope: format!("database `{}`", db.name),
            });
        }

        for (col_position, column) in table.columns.iter().enumerate() {
            if table.columns[col_position + 1..]
                .iter()
                .any(|other| names_match(&other.name, &column.name, delimited))
            {
                return Err(DriftError::AmbiguousIdentity {
                    name: column.name.clone(),
                    scope: format!("table `{}`", table.name),
                });
            }
            if column.auto_increment && !column.type_code.is_numeric() {
                return Err(DriftError::ModelInconsistency(format!(
                    "auto-increment column `{}.{}` has a non-numeric type",
                    table.name, column.name
                )));
            }
        }

        for index in &table.indexes {
            if index.columns.is_empty() {
                return Err(DriftError::ModelInconsistency(format!(
                    "index `{}` on table `{}` has no columns",
                    index.name, table.name
                )));
            }
            for column in &index.columns {
                if table.find_column(column, delimited).is_none() {
                    return Err(DriftError::ModelInconsistency(format!(
                        "index `{}` references unknown column `{}.{}`",
                        index.name, table.name, column
                    )));
                }
            }
        }

        for fk in &table.foreign_keys {
            let target = db.find_table(&fk.referenced_table, delimited).ok_or_else(|| {
                DriftError::ModelInconsistency(format!(
                    "foreign key `{}` on table `{}` references unknown table `{}`",
                    fk.name, table.name, fk.referenced_table
                ))
            })?;
            if fk.references.is_empty() {
                return Err(DriftError::ModelInconsistency(format!(
                    "foreign key `{}` on table `{}` has no column pairs",
                    fk.name, table.name
                )));
            }
            for pair in &fk.references {
                if table.find_column(&pair.local, delimited).is_none() {
                    return Err(DriftError::ModelInconsistency(format!(
                        "foreign key `{}` references unknown column `{}.{}`",
                        fk.name, table.name, pair.local
                    )));
                }
                if target.find_column(&pair.referenced, delimited).is_none() {
                    return Err(DriftError::ModelInconsistency(format!(
                        "foreign key `{}` references unknown column `{}.{}`",
                        fk.name, target.name, pair.referenced
                    )));
                }
            }
        }
    }
    Ok(())
}
