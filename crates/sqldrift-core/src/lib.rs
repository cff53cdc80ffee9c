//! # sqldrift-core
//!
//! Cross-dialect schema migration: diff a current and a desired database
//! model into an ordered change set, then compile that change set to
//! dialect-correct DDL.
//!
//! The pipeline is strictly sequential:
//!
//! 1. **Model** ([`model`]) — plain value types for databases, tables,
//!    columns, indexes and foreign keys.
//! 2. **Differ** ([`diff`]) — validates both models and produces the
//!    ordered [`Change`] set transforming current into desired.
//! 3. **Dialect claim phase** ([`dialect`]) — the active strategy claims
//!    the changes it can express natively and emits its own SQL for
//!    them.
//! 4. **Emission engine** ([`emit`]) — emits the residual changes through
//!    generic statement hooks, falling back to a full table rebuild when
//!    the dialect's [`Capabilities`] rule direct emission out.
//!
//! The current model is mutated change by change as SQL is emitted, so
//! position lookups and later claims always see an up-to-date picture.
//! Applying the full change set converges the current model onto the
//! desired one; emission either yields the complete script or fails
//! atomically with the first unresolvable change.
//!
//! # Example
//!
//! ```rust
//! use sqldrift_core::{diff_database, Column, Database, Table, TypeCode};
//!
//! let current = Database::new("app").table(
//!     Table::new("users").column(Column::new("id", TypeCode::Bigint).primary_key()),
//! );
//! let desired = Database::new("app").table(
//!     Table::new("users")
//!         .column(Column::new("id", TypeCode::Bigint).primary_key())
//!         .column(Column::new("email", TypeCode::Varchar(255)).not_null()),
//! );
//!
//! let changes = diff_database(&current, &desired, false).unwrap();
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].to_string(), "add column users.email");
//! ```

pub mod capability;
pub mod change;
pub mod dialect;
pub mod diff;
pub mod emit;
pub mod error;
pub mod model;

pub use capability::{AutoIncrementStrategy, Capabilities};
pub use change::{
    AddColumnChange, AddForeignKeyChange, AddIndexChange, AddPrimaryKeyChange, AddTableChange,
    Change, ModifyColumnChange, RemoveColumnChange, RemoveForeignKeyChange, RemoveIndexChange,
    RemovePrimaryKeyChange, RemoveTableChange,
};
pub use dialect::Dialect;
pub use diff::{diff_database, validate_model};
pub use emit::{DdlEmitter, EmitContext, PendingChanges, SqlScript, StatementSink};
pub use error::{DriftError, Result};
pub use model::{Column, ColumnPair, Database, DefaultValue, ForeignKey, Index, Table, TypeCode};
