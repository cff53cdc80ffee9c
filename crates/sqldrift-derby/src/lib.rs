//! # sqldrift-derby
//!
//! Derby dialect strategy for `sqldrift-core`.
//!
//! # How Derby differs from other dialects
//!
//! - **Identity columns**: auto-increment uses the inline
//!   `GENERATED BY DEFAULT AS IDENTITY` clause, and the value just
//!   inserted is read back with `VALUES IDENTITY_VAL_LOCAL()`.
//! - **Column additions**: `ALTER TABLE ... ADD COLUMN` can only append,
//!   and cannot add an identity column; anything else goes through table
//!   rebuild.
//! - **Index names are schema-scoped**, so `DROP INDEX` takes no
//!   `ON <table>` clause.
//! - **No boolean literal in defaults**: boolean-typed defaults are
//!   stored as `SMALLINT` `0`/`1`.
//! - **Casts** use the conversion-function form `TYPE(col)`, and numeric
//!   values cannot be converted to `VARCHAR` — `CHAR` is substituted.
//! - **Table renames** use `RENAME TABLE ... TO ...`.

mod dialect;

pub use dialect::DerbyDialect;
