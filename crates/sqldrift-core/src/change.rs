//! Structural change variants.
//!
//! A change is an atomic structural delta between two table or database
//! models. The differ creates changes, dialect strategies claim the ones
//! they can express natively, and the emission engine handles the rest.
//! Every change carries enough context to be rendered as DDL and to be
//! applied to the in-memory current model once emitted.

use std::fmt;

use crate::error::{DriftError, Result};
use crate::model::{names_match, Column, Database, ForeignKey, Index, Table};

/// An atomic structural change.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create a new table.
    AddTable(AddTableChange),
    /// Drop an existing table.
    RemoveTable(RemoveTableChange),
    /// Add a column to an existing table.
    AddColumn(AddColumnChange),
    /// Drop a column from a table.
    RemoveColumn(RemoveColumnChange),
    /// Change a column's type, default, nullability or auto-increment
    /// status. Primary-key membership is expressed separately.
    ModifyColumn(ModifyColumnChange),
    /// Add a primary key over the given columns.
    AddPrimaryKey(AddPrimaryKeyChange),
    /// Drop the table's primary key.
    RemovePrimaryKey(RemovePrimaryKeyChange),
    /// Add a foreign key constraint.
    AddForeignKey(AddForeignKeyChange),
    /// Drop a foreign key constraint.
    RemoveForeignKey(RemoveForeignKeyChange),
    /// Create an index.
    AddIndex(AddIndexChange),
    /// Drop an index.
    RemoveIndex(RemoveIndexChange),
}

/// Create table change. Carries the full desired table so indexes and
/// foreign keys can be emitted with it.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTableChange {
    /// The table to create.
    pub table: Table,
}

/// Drop table change. Carries the full current table so companion
/// objects (generators, triggers) can be dropped with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveTableChange {
    /// The table to drop.
    pub table: Table,
}

/// Add column change, tagged with its insertion point.
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumnChange {
    /// Owning table name.
    pub table: String,
    /// The new column.
    pub column: Column,
    /// Name of the column the new one follows; `None` means first
    /// position.
    pub insert_after: Option<String>,
    /// Whether the column is last in the desired order.
    pub at_end: bool,
}

/// Remove column change. Carries the full old column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveColumnChange {
    /// Owning table name.
    pub table: String,
    /// The column being removed.
    pub column: Column,
}

/// Modify column change: before and after definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyColumnChange {
    /// Owning table name.
    pub table: String,
    /// The column as it currently exists.
    pub old_column: Column,
    /// The column as it should be.
    pub new_column: Column,
}

/// Add primary key change.
#[derive(Debug, Clone, PartialEq)]
pub struct AddPrimaryKeyChange {
    /// Owning table name.
    pub table: String,
    /// Primary-key column names, in key order.
    pub columns: Vec<String>,
}

/// Remove primary key change.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovePrimaryKeyChange {
    /// Owning table name.
    pub table: String,
}

/// Add foreign key change.
#[derive(Debug, Clone, PartialEq)]
pub struct AddForeignKeyChange {
    /// Owning table name.
    pub table: String,
    /// The constraint to add.
    pub foreign_key: ForeignKey,
}

/// Remove foreign key change.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveForeignKeyChange {
    /// Owning table name.
    pub table: String,
    /// The constraint being removed.
    pub foreign_key: ForeignKey,
}

/// Add index change.
#[derive(Debug, Clone, PartialEq)]
pub struct AddIndexChange {
    /// Owning table name.
    pub table: String,
    /// The index to create.
    pub index: Index,
}

/// Remove index change.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveIndexChange {
    /// Owning table name.
    pub table: String,
    /// The index being dropped.
    pub index: Index,
}

impl Change {
    /// Human-readable change kind, used in error reports and listings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddTable(_) => "add table",
            Self::RemoveTable(_) => "remove table",
            Self::AddColumn(_) => "add column",
            Self::RemoveColumn(_) => "remove column",
            Self::ModifyColumn(_) => "modify column",
            Self::AddPrimaryKey(_) => "add primary key",
            Self::RemovePrimaryKey(_) => "remove primary key",
            Self::AddForeignKey(_) => "add foreign key",
            Self::RemoveForeignKey(_) => "remove foreign key",
            Self::AddIndex(_) => "add index",
            Self::RemoveIndex(_) => "remove index",
        }
    }

    /// Name of the table this change targets.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::AddTable(c) => &c.table.name,
            Self::RemoveTable(c) => &c.table.name,
            Self::AddColumn(c) => &c.table,
            Self::RemoveColumn(c) => &c.table,
            Self::ModifyColumn(c) => &c.table,
            Self::AddPrimaryKey(c) => &c.table,
            Self::RemovePrimaryKey(c) => &c.table,
            Self::AddForeignKey(c) => &c.table,
            Self::RemoveForeignKey(c) => &c.table,
            Self::AddIndex(c) => &c.table,
            Self::RemoveIndex(c) => &c.table,
        }
    }

    /// Name of the column this change targets, for column-scoped changes.
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Self::AddColumn(c) => Some(&c.column.name),
            Self::RemoveColumn(c) => Some(&c.column.name),
            Self::ModifyColumn(c) => Some(&c.new_column.name),
            _ => None,
        }
    }

    /// Applies the change to the in-memory current model, so that
    /// subsequent changes (e.g. a column-position lookup) see an
    /// up-to-date picture.
    pub fn apply(&self, db: &mut Database, delimited: bool) -> Result<()> {
        match self {
            Self::AddTable(c) => {
                db.tables.push(c.table.clone());
                Ok(())
            }
            Self::RemoveTable(c) => {
                let index = db
                    .tables
                    .iter()
                    .position(|t| names_match(&t.name, &c.table.name, delimited))
                    .ok_or_else(|| unknown_table(&c.table.name))?;
                db.tables.remove(index);
                Ok(())
            }
            Self::AddColumn(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                let position = if c.at_end {
                    table.columns.len()
                } else {
                    match &c.insert_after {
                        None => 0,
                        Some(previous) => {
                            table
                                .column_index(previous, delimited)
                                .ok_or_else(|| unknown_column(&c.table, previous))?
                                + 1
                        }
                    }
                };
                table.columns.insert(position, c.column.clone());
                Ok(())
            }
            Self::RemoveColumn(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                let index = table
                    .column_index(&c.column.name, delimited)
                    .ok_or_else(|| unknown_column(&c.table, &c.column.name))?;
                table.columns.remove(index);
                Ok(())
            }
            Self::ModifyColumn(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                let column = table
                    .find_column_mut(&c.old_column.name, delimited)
                    .ok_or_else(|| unknown_column(&c.table, &c.old_column.name))?;
                *column = c.new_column.clone();
                Ok(())
            }
            Self::AddPrimaryKey(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                for name in &c.columns {
                    let column = table
                        .find_column_mut(name, delimited)
                        .ok_or_else(|| unknown_column(&c.table, name))?;
                    column.primary_key = true;
                }
                Ok(())
            }
            Self::RemovePrimaryKey(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                for column in &mut table.columns {
                    column.primary_key = false;
                }
                Ok(())
            }
            Self::AddForeignKey(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                table.foreign_keys.push(c.foreign_key.clone());
                Ok(())
            }
            Self::RemoveForeignKey(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                let index = table
                    .foreign_keys
                    .iter()
                    .position(|fk| names_match(&fk.name, &c.foreign_key.name, delimited))
                    .ok_or_else(|| {
                        DriftError::ModelInconsistency(format!(
                            "unknown foreign key `{}` on table `{}`",
                            c.foreign_key.name, c.table
                        ))
                    })?;
                table.foreign_keys.remove(index);
                Ok(())
            }
            Self::AddIndex(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                table.indexes.push(c.index.clone());
                Ok(())
            }
            Self::RemoveIndex(c) => {
                let table = find_table_mut(db, &c.table, delimited)?;
                let index = table
                    .indexes
                    .iter()
                    .position(|idx| names_match(&idx.name, &c.index.name, delimited))
                    .ok_or_else(|| {
                        DriftError::ModelInconsistency(format!(
                            "unknown index `{}` on table `{}`",
                            c.index.name, c.table
                        ))
                    })?;
                table.indexes.remove(index);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column_name() {
            Some(column) => write!(f, "{} {}.{}", self.kind(), self.table_name(), column),
            None => write!(f, "{} {}", self.kind(), self.table_name()),
        }
    }
}

fn find_table_mut<'a>(db: &'a mut Database, name: &str, delimited: bool) -> Result<&'a mut Table> {
    db.find_table_mut(name, delimited)
        .ok_or_else(|| unknown_table(name))
}

fn unknown_table(name: &str) -> DriftError {
    DriftError::ModelInconsistency(format!("unknown table `{name}`"))
}

fn unknown_column(table: &str, column: &str) -> DriftError {
    DriftError::ModelInconsistency(format!("unknown column `{table}.{column}`"))
}

impl From<AddTableChange> for Change {
    fn from(change: AddTableChange) -> Self {
        Self::AddTable(change)
    }
}

impl From<RemoveTableChange> for Change {
    fn from(change: RemoveTableChange) -> Self {
        Self::RemoveTable(change)
    }
}

impl From<AddColumnChange> for Change {
    fn from(change: AddColumnChange) -> Self {
        Self::AddColumn(change)
    }
}

impl From<RemoveColumnChange> for Change {
    fn from(change: RemoveColumnChange) -> Self {
        Self::RemoveColumn(change)
    }
}

impl From<ModifyColumnChange> for Change {
    fn from(change: ModifyColumnChange) -> Self {
        Self::ModifyColumn(change)
    }
}

impl From<AddPrimaryKeyChange> for Change {
    fn from(change: AddPrimaryKeyChange) -> Self {
        Self::AddPrimaryKey(change)
    }
}

impl From<RemovePrimaryKeyChange> for Change {
    fn from(change: RemovePrimaryKeyChange) -> Self {
        Self::RemovePrimaryKey(change)
    }
}

impl From<AddForeignKeyChange> for Change {
    fn from(change: AddForeignKeyChange) -> Self {
        Self::AddForeignKey(change)
    }
}

impl From<RemoveForeignKeyChange> for Change {
    fn from(change: RemoveForeignKeyChange) -> Self {
        Self::RemoveForeignKey(change)
    }
}

impl From<AddIndexChange> for Change {
    fn from(change: AddIndexChange) -> Self {
        Self::AddIndex(change)
    }
}

impl From<RemoveIndexChange> for Change {
    fn from(change: RemoveIndexChange) -> Self {
        Self::RemoveIndex(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeCode;

    fn db() -> Database {
        Database::new("app").table(
            Table::new("users")
                .column(Column::new("id", TypeCode::Bigint).primary_key())
                .column(Column::new("name", TypeCode::Varchar(255)).not_null()),
        )
    }

    #[test]
    fn add_column_at_end() {
        let mut db = db();
        let change = Change::AddColumn(AddColumnChange {
            table: "users".into(),
            column: Column::new("email", TypeCode::Varchar(255)),
            insert_after: Some("name".into()),
            at_end: true,
        });
        change.apply(&mut db, false).unwrap();
        let table = db.find_table("users", false).unwrap();
        assert_eq!(table.column_index("email", false), Some(2));
    }

    #[test]
    fn add_column_in_middle() {
        let mut db = db();
        let change = Change::AddColumn(AddColumnChange {
            table: "users".into(),
            column: Column::new("email", TypeCode::Varchar(255)),
            insert_after: Some("id".into()),
            at_end: false,
        });
        change.apply(&mut db, false).unwrap();
        let table = db.find_table("users", false).unwrap();
        assert_eq!(table.column_index("email", false), Some(1));
        assert_eq!(table.column_index("name", false), Some(2));
    }

    #[test]
    fn add_column_first() {
        let mut db = db();
        let change = Change::AddColumn(AddColumnChange {
            table: "users".into(),
            column: Column::new("tenant", TypeCode::Integer),
            insert_after: None,
            at_end: false,
        });
        change.apply(&mut db, false).unwrap();
        let table = db.find_table("users", false).unwrap();
        assert_eq!(table.column_index("tenant", false), Some(0));
    }

    #[test]
    fn modify_column_preserves_position() {
        let mut db = db();
        let old = Column::new("name", TypeCode::Varchar(255)).not_null();
        let new = Column::new("name", TypeCode::Varchar(500));
        let change = Change::ModifyColumn(ModifyColumnChange {
            table: "users".into(),
            old_column: old,
            new_column: new,
        });
        change.apply(&mut db, false).unwrap();
        let table = db.find_table("users", false).unwrap();
        assert_eq!(table.column_index("name", false), Some(1));
        let column = table.find_column("name", false).unwrap();
        assert_eq!(column.type_code, TypeCode::Varchar(500));
        assert!(column.nullable);
    }

    #[test]
    fn primary_key_pair() {
        let mut db = db();
        Change::RemovePrimaryKey(RemovePrimaryKeyChange {
            table: "users".into(),
        })
        .apply(&mut db, false)
        .unwrap();
        assert_eq!(
            db.find_table("users", false).unwrap().primary_key_columns().count(),
            0
        );

        Change::AddPrimaryKey(AddPrimaryKeyChange {
            table: "users".into(),
            columns: vec!["name".into()],
        })
        .apply(&mut db, false)
        .unwrap();
        let pk: Vec<&str> = db
            .find_table("users", false)
            .unwrap()
            .primary_key_columns()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(pk, vec!["name"]);
    }

    #[test]
    fn apply_to_unknown_table_fails() {
        let mut db = db();
        let change = Change::RemoveColumn(RemoveColumnChange {
            table: "missing".into(),
            column: Column::new("x", TypeCode::Integer),
        });
        let err = change.apply(&mut db, false).unwrap_err();
        assert!(matches!(err, DriftError::ModelInconsistency(_)));
    }

    #[test]
    fn display_names_the_target() {
        let change = Change::RemoveColumn(RemoveColumnChange {
            table: "users".into(),
            column: Column::new("name", TypeCode::Varchar(255)),
        });
        assert_eq!(change.to_string(), "remove column users.name");
    }
}
