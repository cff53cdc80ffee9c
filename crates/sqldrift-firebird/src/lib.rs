//! # sqldrift-firebird
//!
//! Firebird dialect strategy for `sqldrift-core`.
//!
//! # How Firebird differs from other dialects
//!
//! - **Auto-increment is emulated**, not native: each auto-increment
//!   column gets a `GENERATOR` sequence object and a `BEFORE INSERT`
//!   trigger that assigns the next generator value only when the column
//!   is null. The value just inserted is read back with
//!   `SELECT GEN_ID(<generator>, 0) FROM RDB$DATABASE`.
//! - **Columns can only be appended physically**, but a later
//!   `ALTER TABLE ... ALTER <column> POSITION <n>` relocates them, so
//!   mid-table insertions are staged as append-then-move.
//! - **Primary-key constraint names are not tracked**, so primary keys
//!   cannot be dropped and re-created here; those changes are reported
//!   as unsupported rather than silently skipped.
//! - **Index names are schema-scoped**, so `DROP INDEX` takes no
//!   `ON <table>` clause.
//! - **Identifiers are limited to 31 characters**; generated names are
//!   truncated to fit.
//! - **No boolean type**: boolean columns are `SMALLINT` with `0`/`1`
//!   defaults.

mod dialect;

pub use dialect::FirebirdDialect;
