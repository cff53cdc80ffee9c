//! Derby dialect implementation.

use sqldrift_core::capability::{AutoIncrementStrategy, Capabilities};
use sqldrift_core::change::Change;
use sqldrift_core::dialect::Dialect;
use sqldrift_core::emit::{EmitContext, PendingChanges};
use sqldrift_core::error::Result;
use sqldrift_core::model::{Column, DefaultValue, Index, Table, TypeCode};

const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "AT", "BETWEEN", "BOTH", "BY", "CALL", "CASE",
    "CAST", "CHECK", "COLUMN", "CONSTRAINT", "CREATE", "CURRENT", "CURSOR", "DELETE", "DISTINCT",
    "DROP", "ELSE", "END", "EXISTS", "FOR", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN",
    "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "NOT", "NULL", "ON",
    "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "UNION",
    "UNIQUE", "UPDATE", "USER", "VALUES", "WHERE", "WITH",
];

const CAPABILITIES: Capabilities = Capabilities {
    reorder_columns: false,
    add_column_in_middle: false,
    alter_column_type: false,
    drop_columns: false,
    drop_primary_key_column: false,
    named_primary_keys: true,
    auto_increment: AutoIncrementStrategy::NativeIdentity,
    max_identifier_length: 128,
    reserved_words: RESERVED_WORDS,
};

/// Derby dialect strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerbyDialect {
    delimited: bool,
}

impl DerbyDialect {
    /// Creates a new Derby dialect with delimited identifiers off.
    #[must_use]
    pub const fn new() -> Self {
        Self { delimited: false }
    }

    /// Creates a Derby dialect with the given identifier mode.
    #[must_use]
    pub const fn with_delimited_identifiers(delimited: bool) -> Self {
        Self { delimited }
    }
}

impl Dialect for DerbyDialect {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn capabilities(&self) -> &Capabilities {
        &CAPABILITIES
    }

    fn delimited_identifiers(&self) -> bool {
        self.delimited
    }

    fn native_type(&self, column: &Column) -> String {
        match column.type_code {
            TypeCode::Smallint => "SMALLINT".to_string(),
            TypeCode::Integer => "INTEGER".to_string(),
            TypeCode::Bigint => "BIGINT".to_string(),
            TypeCode::Real => "REAL".to_string(),
            TypeCode::Double => "DOUBLE".to_string(),
            TypeCode::Decimal(p, s) => format!("DECIMAL({p},{s})"),
            TypeCode::Numeric(p, s) => format!("NUMERIC({p},{s})"),
            TypeCode::Char(n) => format!("CHAR({n})"),
            TypeCode::Varchar(n) => format!("VARCHAR({n})"),
            TypeCode::Binary(n) => format!("CHAR({n}) FOR BIT DATA"),
            TypeCode::Varbinary(n) => format!("VARCHAR({n}) FOR BIT DATA"),
            TypeCode::Blob => "BLOB".to_string(),
            TypeCode::Clob => "CLOB".to_string(),
            TypeCode::Boolean => "SMALLINT".to_string(),
            TypeCode::Date => "DATE".to_string(),
            TypeCode::Time => "TIME".to_string(),
            TypeCode::Timestamp => "TIMESTAMP".to_string(),
        }
    }

    fn native_default(&self, column: &Column) -> Option<String> {
        // Boolean columns are stored as SMALLINT, so their defaults
        // become 0/1 literals.
        match (&column.type_code, &column.default) {
            (TypeCode::Boolean, Some(DefaultValue::Bool(value))) => {
                Some(if *value { "1" } else { "0" }.to_string())
            }
            _ => column.default.as_ref().map(DefaultValue::to_sql),
        }
    }

    fn auto_increment_clause(&self, _column: &Column) -> Option<String> {
        Some("GENERATED BY DEFAULT AS IDENTITY".to_string())
    }

    fn select_last_insert_sql(&self, _table: &Table) -> Option<String> {
        Some("VALUES IDENTITY_VAL_LOCAL()".to_string())
    }

    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.quote_identifier(old_name),
            self.quote_identifier(new_name)
        )
    }

    fn drop_index_sql(&self, _table: &str, index: &Index) -> String {
        // Index names are unique to the schema, so no ON clause.
        format!("DROP INDEX {}", self.quote_identifier(&index.name))
    }

    fn cast_expression(&self, source: &Column, target: &Column) -> String {
        let column = self.quote_identifier(&source.name);
        let source_type = self.bare_native_type(source);
        let mut target_type = self.bare_native_type(target);
        if source_type == target_type {
            return column;
        }
        // Numeric values cannot be converted to VARCHAR, though CHAR
        // works.
        if source.type_code.is_numeric() && target_type == "VARCHAR" {
            target_type = "CHAR".to_string();
        }
        format!("{target_type}({column})")
    }

    fn claim_table_changes(
        &self,
        ctx: &mut EmitContext<'_>,
        pending: &mut PendingChanges,
    ) -> Result<()> {
        // Only appended, non-identity columns can be added in place;
        // everything else falls through to the generic engine.
        for index in 0..pending.len() {
            if pending.is_claimed(index) {
                continue;
            }
            let claimable = match pending.get(index) {
                Change::AddColumn(add) => add.at_end && !add.column.auto_increment,
                _ => false,
            };
            if !claimable {
                continue;
            }
            let change = pending.get(index).clone();
            if let Change::AddColumn(add) = &change {
                ctx.statement(self.add_column_sql(add));
            }
            ctx.apply(&change)?;
            pending.claim(index);
        }
        Ok(())
    }
}
