//! Schema model value types.
//!
//! These types describe the structure of a database — tables, columns,
//! indexes and foreign keys — and are shared by the differ and the DDL
//! emission engine. They are plain values: the differ only reads them,
//! while the emitter mutates its private "current" copy change by change
//! so that later changes observe an up-to-date picture.
//!
//! Identifier lookups case-fold (ASCII) unless delimited-identifier mode
//! is on; the same flag must be passed everywhere identifiers are
//! compared, or lookups will silently mismatch.

use serde::{Deserialize, Serialize};

/// Semantic SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCode {
    /// Small integer (16-bit).
    Smallint,
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    Bigint,
    /// Floating point (single precision).
    Real,
    /// Floating point (double precision).
    Double,
    /// Exact decimal with precision and scale.
    Decimal(u8, u8),
    /// Numeric (alias for Decimal on most databases).
    Numeric(u8, u8),
    /// Fixed-length character string.
    Char(usize),
    /// Variable-length character string.
    Varchar(usize),
    /// Fixed-length binary data.
    Binary(usize),
    /// Variable-length binary data.
    Varbinary(usize),
    /// Binary large object.
    Blob,
    /// Character large object.
    Clob,
    /// Boolean.
    Boolean,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    Timestamp,
}

impl TypeCode {
    /// Returns whether this is a numeric type.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Smallint
                | Self::Integer
                | Self::Bigint
                | Self::Real
                | Self::Double
                | Self::Decimal(_, _)
                | Self::Numeric(_, _)
        )
    }

    /// Returns whether this is a character type.
    #[must_use]
    pub fn is_character(self) -> bool {
        matches!(self, Self::Char(_) | Self::Varchar(_))
    }

    /// Returns whether this is a binary type.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Binary(_) | Self::Varbinary(_) | Self::Blob)
    }

    /// Returns whether this is the boolean type.
    #[must_use]
    pub fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Returns whether this is a temporal type.
    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Returns whether this is a large-object type.
    #[must_use]
    pub fn is_lob(self) -> bool {
        matches!(self, Self::Blob | Self::Clob)
    }
}

/// Typed default value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// Raw SQL expression (e.g., `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Renders the default as a generic SQL literal. Dialects that cannot
    /// express a literal form directly coerce it via their
    /// `native_default` hook instead.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::String(value) => format!("'{}'", value.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// A single column.
///
/// The column's ordinal position is its index in the owning table's
/// `columns` vector; the order is significant and defines the physical
/// layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Semantic type.
    pub type_code: TypeCode,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Default value, if any.
    pub default: Option<DefaultValue>,
    /// Whether the column auto-increments. Only valid on numeric types.
    pub auto_increment: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

impl Column {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            nullable: true,
            default: None,
            auto_increment: false,
            primary_key: false,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as part of the primary key (implicitly NOT NULL).
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }
}

/// An index over an ordered set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Whether this is a UNIQUE index.
    pub unique: bool,
    /// Referenced column names, in creation order.
    pub columns: Vec<String>,
}

impl Index {
    /// Creates a new non-unique index with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            columns: Vec::new(),
        }
    }

    /// Marks the index UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Appends a referenced column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }
}

/// One (local, referenced) column pairing of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    /// Column in the referencing table.
    pub local: String,
    /// Column in the referenced table.
    pub referenced: String,
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Referenced table name.
    pub referenced_table: String,
    /// Ordered (local, referenced) column pairs.
    pub references: Vec<ColumnPair>,
}

impl ForeignKey {
    /// Creates a new foreign key with no column pairs.
    #[must_use]
    pub fn new(name: impl Into<String>, referenced_table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referenced_table: referenced_table.into(),
            references: Vec::new(),
        }
    }

    /// Appends a (local, referenced) column pair.
    #[must_use]
    pub fn reference(mut self, local: impl Into<String>, referenced: impl Into<String>) -> Self {
        self.references.push(ColumnPair {
            local: local.into(),
            referenced: referenced.into(),
        });
        self
    }

    /// Local column names, in order.
    pub fn local_columns(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|pair| pair.local.as_str())
    }

    /// Referenced column names, in order.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|pair| pair.referenced.as_str())
    }
}

/// A table: ordered columns plus its indexes and foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns in physical order.
    pub columns: Vec<Column>,
    /// Indexes on this table.
    pub indexes: Vec<Index>,
    /// Foreign keys on this table.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Creates a new empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Looks up a column by name under the given identifier mode.
    #[must_use]
    pub fn find_column(&self, name: &str, delimited: bool) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| names_match(&column.name, name, delimited))
    }

    /// Mutable column lookup.
    #[must_use]
    pub fn find_column_mut(&mut self, name: &str, delimited: bool) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| names_match(&column.name, name, delimited))
    }

    /// Returns the zero-based position of a column.
    #[must_use]
    pub fn column_index(&self, name: &str, delimited: bool) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| names_match(&column.name, name, delimited))
    }

    /// Primary-key columns, in column order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.primary_key)
    }

    /// Auto-increment columns, in column order.
    pub fn auto_increment_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.auto_increment)
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn find_index(&self, name: &str, delimited: bool) -> Option<&Index> {
        self.indexes
            .iter()
            .find(|index| names_match(&index.name, name, delimited))
    }

    /// Looks up a foreign key by name.
    #[must_use]
    pub fn find_foreign_key(&self, name: &str, delimited: bool) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| names_match(&fk.name, name, delimited))
    }
}

/// A database: an ordered set of tables keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Database name.
    pub name: String,
    /// Tables, in definition order.
    pub tables: Vec<Table>,
}

impl Database {
    /// Creates a new empty database model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Looks up a table by name under the given identifier mode.
    #[must_use]
    pub fn find_table(&self, name: &str, delimited: bool) -> Option<&Table> {
        self.tables
            .iter()
            .find(|table| names_match(&table.name, name, delimited))
    }

    /// Mutable table lookup.
    #[must_use]
    pub fn find_table_mut(&mut self, name: &str, delimited: bool) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|table| names_match(&table.name, name, delimited))
    }

    /// Table names, in order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.name.as_str())
    }
}

/// Compares two identifiers under the given mode: exact when delimited,
/// ASCII case-folded otherwise.
pub(crate) fn names_match(a: &str, b: &str, delimited: bool) -> bool {
    if delimited {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}
