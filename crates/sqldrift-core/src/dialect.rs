//! The dialect hook table.
//!
//! [`Dialect`] is the seam between the generic emission engine and a
//! database platform: a fixed set of hooks with generic default behavior
//! that each platform overrides where its SQL differs. The engine
//! composes a dialect by reference — there is no inheritance hierarchy,
//! just this trait plus the dialect's [`Capabilities`] descriptor.
//!
//! The delimited-identifier mode lives on the dialect instance and must
//! be the same flag passed to the differ, or identifier comparisons will
//! silently mismatch.

use crate::capability::Capabilities;
use crate::change::AddColumnChange;
use crate::emit::{EmitContext, PendingChanges};
use crate::error::Result;
use crate::model::{Column, DefaultValue, ForeignKey, Index, Table};

/// Dialect strategy: capability descriptor plus SQL generation hooks.
pub trait Dialect: std::fmt::Debug {
    /// Dialect name, used in logs and error reports.
    fn name(&self) -> &'static str;

    /// The dialect's capability descriptor.
    fn capabilities(&self) -> &Capabilities;

    /// Whether identifiers are delimited (quoted and case-sensitive).
    fn delimited_identifiers(&self) -> bool;

    /// Maps a column to its native type declaration, e.g. `VARCHAR(50)`.
    fn native_type(&self, column: &Column) -> String;

    /// The identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Statement terminator appended when rendering a script.
    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    /// Whether the identifier is a reserved word of this dialect.
    fn is_reserved_word(&self, name: &str) -> bool {
        self.capabilities()
            .reserved_words
            .iter()
            .any(|word| word.eq_ignore_ascii_case(name))
    }

    /// Quotes an identifier when delimited mode is on or the name is
    /// reserved; embedded quote characters are doubled.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.quote_char();
        if self.delimited_identifiers() || self.is_reserved_word(name) {
            let mut doubled = String::new();
            doubled.push(quote);
            doubled.push(quote);
            format!("{quote}{}{quote}", name.replace(quote, &doubled))
        } else {
            name.to_string()
        }
    }

    /// Strips quoting from an identifier, undoing the doubling. Unquoted
    /// input is returned unchanged, so the operation is idempotent.
    fn unquote_identifier(&self, name: &str) -> String {
        let quote = self.quote_char();
        match name
            .strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
        {
            Some(inner) => {
                let mut doubled = String::new();
                doubled.push(quote);
                doubled.push(quote);
                inner.replace(&doubled, &quote.to_string())
            }
            None => name.to_string(),
        }
    }

    /// Renders a string literal with embedded quotes doubled.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Inverse of [`Dialect::string_literal`]; idempotent on unquoted
    /// input.
    fn unescape_string_literal(&self, value: &str) -> String {
        match value
            .strip_prefix('\'')
            .and_then(|inner| inner.strip_suffix('\''))
        {
            Some(inner) => inner.replace("''", "'"),
            None => value.to_string(),
        }
    }

    /// The native type without its size suffix: `VARCHAR(50)` becomes
    /// `VARCHAR`.
    fn bare_native_type(&self, column: &Column) -> String {
        let native = self.native_type(column);
        match native.find('(') {
            Some(position) => native[..position].trim_end().to_string(),
            None => native,
        }
    }

    /// Renders a column default in the dialect's native literal form.
    fn native_default(&self, column: &Column) -> Option<String> {
        column.default.as_ref().map(DefaultValue::to_sql)
    }

    /// Cast expression used when copying a column during table rebuild.
    /// Identical bare native types need no cast.
    fn cast_expression(&self, source: &Column, target: &Column) -> String {
        let column = self.quote_identifier(&source.name);
        if self.bare_native_type(source) == self.bare_native_type(target) {
            column
        } else {
            format!("CAST({column} AS {})", self.native_type(target))
        }
    }

    /// Inline identity clause for an auto-increment column, e.g.
    /// `GENERATED BY DEFAULT AS IDENTITY`. Dialects that emulate
    /// auto-increment with companion objects return `None`.
    fn auto_increment_clause(&self, _column: &Column) -> Option<String> {
        None
    }

    /// Companion statements creating the auto-increment machinery for a
    /// column (sequence, trigger). Empty for native-identity dialects.
    fn auto_increment_create_sql(&self, _table: &Table, _column: &Column) -> Vec<String> {
        Vec::new()
    }

    /// Companion statements tearing the auto-increment machinery down.
    fn auto_increment_drop_sql(&self, _table: &Table, _column: &Column) -> Vec<String> {
        Vec::new()
    }

    /// The dialect's idiom for reading the identity value just inserted
    /// into the table, if it has one.
    fn select_last_insert_sql(&self, _table: &Table) -> Option<String> {
        None
    }

    /// Renders a column definition: name, type, default, identity
    /// clause, nullability.
    fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(&column.name),
            self.native_type(column)
        );
        if let Some(default) = self.native_default(column) {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default);
        }
        if column.auto_increment {
            if let Some(clause) = self.auto_increment_clause(column) {
                sql.push(' ');
                sql.push_str(&clause);
            }
        }
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    /// Generates a `CREATE TABLE` statement with an embedded primary-key
    /// clause.
    fn create_table_sql(&self, table: &Table) -> String {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|column| format!("    {}", self.column_definition(column)))
            .collect();
        let pk: Vec<String> = table
            .primary_key_columns()
            .map(|column| self.quote_identifier(&column.name))
            .collect();
        if !pk.is_empty() {
            lines.push(format!("    PRIMARY KEY ({})", pk.join(", ")));
        }
        format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote_identifier(&table.name),
            lines.join(",\n")
        )
    }

    /// Generates a `DROP TABLE` statement.
    fn drop_table_sql(&self, table: &Table) -> String {
        format!("DROP TABLE {}", self.quote_identifier(&table.name))
    }

    /// Generates a table rename statement.
    fn rename_table_sql(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_identifier(old_name),
            self.quote_identifier(new_name)
        )
    }

    /// Generates an `ADD COLUMN` statement.
    fn add_column_sql(&self, change: &AddColumnChange) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_identifier(&change.table),
            self.column_definition(&change.column)
        )
    }

    /// Generates a `DROP COLUMN` statement.
    fn drop_column_sql(&self, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_identifier(table),
            self.quote_identifier(&column.name)
        )
    }

    /// Generates a column type change statement.
    fn alter_column_type_sql(&self, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {}",
            self.quote_identifier(table),
            self.quote_identifier(&column.name),
            self.native_type(column)
        )
    }

    /// Generates a nullability change statement for the column's new
    /// state.
    fn alter_column_nullable_sql(&self, table: &str, column: &Column) -> String {
        let action = if column.nullable {
            "DROP NOT NULL"
        } else {
            "SET NOT NULL"
        };
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {action}",
            self.quote_identifier(table),
            self.quote_identifier(&column.name)
        )
    }

    /// Generates a default change statement for the column's new state.
    fn alter_column_default_sql(&self, table: &str, column: &Column) -> String {
        match self.native_default(column) {
            Some(default) => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {default}",
                self.quote_identifier(table),
                self.quote_identifier(&column.name)
            ),
            None => format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
                self.quote_identifier(table),
                self.quote_identifier(&column.name)
            ),
        }
    }

    /// Generates an `ADD PRIMARY KEY` statement: a named constraint when
    /// the dialect tracks primary-key names, bare otherwise.
    fn add_primary_key_sql(&self, table: &str, columns: &[String]) -> String {
        let cols = columns
            .iter()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        if self.capabilities().named_primary_keys {
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({cols})",
                self.quote_identifier(table),
                self.quote_identifier(&self.primary_key_name(table))
            )
        } else {
            format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({cols})",
                self.quote_identifier(table)
            )
        }
    }

    /// Generates a primary-key drop statement by generated name.
    fn drop_primary_key_sql(&self, table: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_identifier(table),
            self.quote_identifier(&self.primary_key_name(table))
        )
    }

    /// Generates an `ADD CONSTRAINT ... FOREIGN KEY` statement.
    fn add_foreign_key_sql(&self, table: &str, foreign_key: &ForeignKey) -> String {
        let local = foreign_key
            .local_columns()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let referenced = foreign_key
            .referenced_columns()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({local}) REFERENCES {} ({referenced})",
            self.quote_identifier(table),
            self.quote_identifier(&foreign_key.name),
            self.quote_identifier(&foreign_key.referenced_table)
        )
    }

    /// Generates a foreign-key drop statement.
    fn drop_foreign_key_sql(&self, table: &str, foreign_key: &ForeignKey) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_identifier(table),
            self.quote_identifier(&foreign_key.name)
        )
    }

    /// Generates a `CREATE INDEX` statement.
    fn create_index_sql(&self, table: &str, index: &Index) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let cols = index
            .columns
            .iter()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE {unique}INDEX {} ON {} ({cols})",
            self.quote_identifier(&index.name),
            self.quote_identifier(table)
        )
    }

    /// Generates a `DROP INDEX` statement. The default includes the
    /// `ON <table>` clause; dialects whose index names are scoped to the
    /// schema rather than the table override this to omit it.
    fn drop_index_sql(&self, table: &str, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(&index.name),
            self.quote_identifier(table)
        )
    }

    /// Builds a generated object name `<prefix>_<table>_<suffix>`
    /// truncated to the dialect's identifier limit. A table name already
    /// ending in `_` (a rebuild backup) gets its suffix marked too, so
    /// the backup's companion objects never collide with the original's.
    fn constraint_name(&self, prefix: &str, table: &str, suffix: &str) -> String {
        let mut suffix = suffix.to_string();
        if table.ends_with('_') && !suffix.is_empty() {
            suffix.push('_');
        }
        let name = if suffix.is_empty() {
            format!("{prefix}_{table}")
        } else {
            format!("{prefix}_{table}_{suffix}")
        };
        truncate_identifier(name, self.capabilities().max_identifier_length)
    }

    /// Generated primary-key constraint name.
    fn primary_key_name(&self, table: &str) -> String {
        self.constraint_name("pk", table, "")
    }

    /// Name of the temporary table used during rebuild.
    fn temp_table_name(&self, table: &str) -> String {
        let max = self.capabilities().max_identifier_length;
        if table.chars().count() >= max {
            let mut name: String = table.chars().take(max - 1).collect();
            name.push('_');
            name
        } else {
            format!("{table}_")
        }
    }

    /// Claim phase: the dialect may handle any subset of a table's
    /// pending changes natively, emitting SQL and applying each claimed
    /// change to the current model immediately so that later claims see
    /// the updated picture. The default claims nothing.
    fn claim_table_changes(
        &self,
        _ctx: &mut EmitContext<'_>,
        _pending: &mut PendingChanges,
    ) -> Result<()> {
        Ok(())
    }

    /// Whether the table-rebuild fallback is available on this dialect.
    fn supports_table_rebuild(&self) -> bool {
        true
    }
}

fn truncate_identifier(name: String, max: usize) -> String {
    if name.chars().count() > max {
        name.chars().take(max).collect()
    } else {
        name
    }
}
