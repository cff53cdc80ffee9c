//! Firebird dialect implementation.

use sqldrift_core::capability::{AutoIncrementStrategy, Capabilities};
use sqldrift_core::change::{AddColumnChange, Change, RemoveColumnChange};
use sqldrift_core::dialect::Dialect;
use sqldrift_core::emit::{EmitContext, PendingChanges};
use sqldrift_core::error::{DriftError, Result};
use sqldrift_core::model::{Column, DefaultValue, Index, Table, TypeCode};

const RESERVED_WORDS: &[&str] = &[
    "ACTIVE", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "AT", "BEFORE", "BEGIN", "BETWEEN", "BY",
    "CAST", "CHECK", "COLUMN", "CONSTRAINT", "CREATE", "CURRENT", "DELETE", "DISTINCT", "DROP",
    "ELSE", "END", "EXISTS", "FOR", "FOREIGN", "FROM", "GENERATOR", "GRANT", "GROUP", "HAVING",
    "IN", "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "NOT", "NULL",
    "ON", "OR", "ORDER", "OUTER", "POSITION", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET",
    "TABLE", "TRIGGER", "UNION", "UNIQUE", "UPDATE", "VALUES", "WHERE", "WITH",
];

const CAPABILITIES: Capabilities = Capabilities {
    reorder_columns: true,
    add_column_in_middle: false,
    alter_column_type: true,
    drop_columns: true,
    drop_primary_key_column: false,
    named_primary_keys: false,
    auto_increment: AutoIncrementStrategy::SequenceAndTrigger,
    max_identifier_length: 31,
    reserved_words: RESERVED_WORDS,
};

/// Firebird dialect strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdDialect {
    delimited: bool,
}

impl FirebirdDialect {
    /// Creates a new Firebird dialect with delimited identifiers off.
    #[must_use]
    pub const fn new() -> Self {
        Self { delimited: false }
    }

    /// Creates a Firebird dialect with the given identifier mode.
    #[must_use]
    pub const fn with_delimited_identifiers(delimited: bool) -> Self {
        Self { delimited }
    }

    /// Name of the generator backing an auto-increment column.
    fn generator_name(&self, table: &str, column: &Column) -> String {
        self.constraint_name("gen", table, &column.name)
    }

    /// Name of the trigger backing an auto-increment column.
    fn trigger_name(&self, table: &str, column: &Column) -> String {
        self.constraint_name("trg", table, &column.name)
    }

    /// Emits a claimed column addition: append, relocate if it is not
    /// meant to be last, then create the generator and trigger for
    /// auto-increment columns.
    fn emit_add_column(&self, ctx: &mut EmitContext<'_>, add: &AddColumnChange) -> Result<()> {
        ctx.statement(self.add_column_sql(add));

        if !add.at_end && self.capabilities().reorder_columns {
            // columns can only be appended; positions are 1-based and
            // computed against the current model before the column lands
            let position = match &add.insert_after {
                None => 1,
                Some(previous) => {
                    let table = self.current_table(ctx, &add.table)?;
                    table
                        .column_index(previous, self.delimited)
                        .ok_or_else(|| {
                            DriftError::ModelInconsistency(format!(
                                "unknown column `{}.{previous}`",
                                add.table
                            ))
                        })?
                        + 2
                }
            };
            ctx.statement(format!(
                "ALTER TABLE {} ALTER {} POSITION {position}",
                self.quote_identifier(&add.table),
                self.quote_identifier(&add.column.name)
            ));
        }

        if add.column.auto_increment {
            let creates = {
                let table = self.current_table(ctx, &add.table)?;
                self.auto_increment_create_sql(table, &add.column)
            };
            for sql in creates {
                ctx.statement(sql);
            }
        }
        Ok(())
    }

    /// Emits a claimed column removal, dropping the trigger and
    /// generator first for auto-increment columns.
    fn emit_remove_column(
        &self,
        ctx: &mut EmitContext<'_>,
        remove: &RemoveColumnChange,
    ) -> Result<()> {
        if remove.column.auto_increment {
            let drops = {
                let table = self.current_table(ctx, &remove.table)?;
                self.auto_increment_drop_sql(table, &remove.column)
            };
            for sql in drops {
                ctx.statement(sql);
            }
        }
        ctx.statement(format!(
            "ALTER TABLE {} DROP {}",
            self.quote_identifier(&remove.table),
            self.quote_identifier(&remove.column.name)
        ));
        Ok(())
    }

    fn current_table<'c>(&self, ctx: &'c EmitContext<'_>, name: &str) -> Result<&'c Table> {
        ctx.current()
            .find_table(name, self.delimited)
            .ok_or_else(|| DriftError::ModelInconsistency(format!("unknown table `{name}`")))
    }
}

impl Dialect for FirebirdDialect {
    fn name(&self) -> &'static str {
        "firebird"
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
            TypeCode::Bigint => "NUMERIC(18,0)".to_string(),
            TypeCode::Real => "FLOAT".to_string(),
            TypeCode::Double => "DOUBLE PRECISION".to_string(),
            TypeCode::Decimal(p, s) => format!("DECIMAL({p},{s})"),
            TypeCode::Numeric(p, s) => format!("NUMERIC({p},{s})"),
            TypeCode::Char(n) => format!("CHAR({n})"),
            TypeCode::Varchar(n) => format!("VARCHAR({n})"),
            TypeCode::Binary(n) => format!("CHAR({n}) CHARACTER SET OCTETS"),
            TypeCode::Varbinary(n) => format!("VARCHAR({n}) CHARACTER SET OCTETS"),
            TypeCode::Blob => "BLOB".to_string(),
            TypeCode::Clob => "BLOB SUB_TYPE TEXT".to_string(),
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
        // identity is emulated with a generator and trigger instead
        None
    }

    fn auto_increment_create_sql(&self, table: &Table, column: &Column) -> Vec<String> {
        let generator = self.quote_identifier(&self.generator_name(&table.name, column));
        let trigger = self.quote_identifier(&self.trigger_name(&table.name, column));
        let table_name = self.quote_identifier(&table.name);
        let column_name = self.quote_identifier(&column.name);
        vec![
            format!("CREATE GENERATOR {generator}"),
            format!(
                "CREATE TRIGGER {trigger} FOR {table_name} ACTIVE BEFORE INSERT POSITION 0 AS \
                 BEGIN IF (NEW.{column_name} IS NULL) THEN NEW.{column_name} = \
                 GEN_ID({generator}, 1); END"
            ),
        ]
    }

    fn auto_increment_drop_sql(&self, table: &Table, column: &Column) -> Vec<String> {
        vec![
            format!(
                "DROP TRIGGER {}",
                self.quote_identifier(&self.trigger_name(&table.name, column))
            ),
            format!(
                "DROP GENERATOR {}",
                self.quote_identifier(&self.generator_name(&table.name, column))
            ),
        ]
    }

    fn select_last_insert_sql(&self, table: &Table) -> Option<String> {
        let reads: Vec<String> = table
            .auto_increment_columns()
            .map(|column| {
                format!(
                    "GEN_ID({}, 0)",
                    self.quote_identifier(&self.generator_name(&table.name, column))
                )
            })
            .collect();
        if reads.is_empty() {
            None
        } else {
            Some(format!("SELECT {} FROM RDB$DATABASE", reads.join(", ")))
        }
    }

    fn add_column_sql(&self, change: &AddColumnChange) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_identifier(&change.table),
            self.column_definition(&change.column)
        )
    }

    fn alter_column_type_sql(&self, table: &str, column: &Column) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote_identifier(table),
            self.quote_identifier(&column.name),
            self.native_type(column)
        )
    }

    fn drop_index_sql(&self, _table: &str, index: &Index) -> String {
        // Index names are unique to the schema, so no ON clause.
        format!("DROP INDEX {}", self.quote_identifier(&index.name))
    }

    fn claim_table_changes(
        &self,
        ctx: &mut EmitContext<'_>,
        pending: &mut PendingChanges,
    ) -> Result<()> {
        // Primary-key constraint names are not tracked, so a key cannot
        // be dropped and re-created in one pass; any change touching
        // primary-key columns stays unclaimed.
        let mut pk_column_added = false;

        for index in 0..pending.len() {
            if pending.is_claimed(index) {
                continue;
            }
            match pending.get(index).clone() {
                Change::AddColumn(add) => {
                    if add.column.primary_key {
                        pk_column_added = true;
                        continue;
                    }
                    self.emit_add_column(ctx, &add)?;
                    ctx.apply(&Change::AddColumn(add))?;
                    pending.claim(index);
                }
                Change::RemoveColumn(remove) => {
                    if remove.column.primary_key {
                        continue;
                    }
                    self.emit_remove_column(ctx, &remove)?;
                    ctx.apply(&Change::RemoveColumn(remove))?;
                    pending.claim(index);
                }
                _ => {}
            }
        }

        // A primary key can only be added once every one of its columns
        // exists, i.e. none was added during this alteration.
        for index in 0..pending.len() {
            if pending.is_claimed(index) {
                continue;
            }
            if let Change::AddPrimaryKey(add) = pending.get(index).clone() {
                if pk_column_added {
                    continue;
                }
                ctx.statement(self.add_primary_key_sql(&add.table, &add.columns));
                ctx.apply(&Change::AddPrimaryKey(add))?;
                pending.claim(index);
            }
        }
        Ok(())
    }

    fn supports_table_rebuild(&self) -> bool {
        // no rebuild fallback: what cannot be altered in place is
        // reported as unsupported
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqldrift_core::diff::diff_database;
    use sqldrift_core::emit::{DdlEmitter, SqlScript};
    use sqldrift_core::model::Database;

    fn dialect() -> FirebirdDialect {
        FirebirdDialect::new()
    }

    fn plan(
        current: &Database,
        desired: &Database,
    ) -> sqldrift_core::error::Result<(SqlScript, Database)> {
        let d = dialect();
        let changes = diff_database(current, desired, d.delimited_identifiers())?;
        let mut tracked = current.clone();
        let script = DdlEmitter::new(&d).emit(&mut tracked, desired, changes)?;
        Ok((script, tracked))
    }

    #[test]
    fn auto_increment_column_addition_creates_generator_and_trigger() {
        let current = Database::new("app").table(Table::new("T"));
        let desired = Database::new("app").table(
            Table::new("T").column(Column::new("id", TypeCode::Integer).auto_increment()),
        );
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(
            script.statements(),
            [
                "ALTER TABLE T ADD id INTEGER",
                "CREATE GENERATOR gen_T_id",
                "CREATE TRIGGER trg_T_id FOR T ACTIVE BEFORE INSERT POSITION 0 AS BEGIN IF \
                 (NEW.id IS NULL) THEN NEW.id = GEN_ID(gen_T_id, 1); END",
            ]
        );
    }

    #[test]
    fn auto_increment_column_removal_drops_trigger_then_generator() {
        let current = Database::new("app").table(
            Table::new("T")
                .column(Column::new("id", TypeCode::Integer).auto_increment())
                .column(Column::new("name", TypeCode::Varchar(50))),
        );
        let desired = Database::new("app")
            .table(Table::new("T").column(Column::new("name", TypeCode::Varchar(50))));
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(
            script.statements(),
            [
                "DROP TRIGGER trg_T_id",
                "DROP GENERATOR gen_T_id",
                "ALTER TABLE T DROP id",
            ]
        );
    }

    #[test]
    fn mid_table_addition_is_appended_then_repositioned() {
        let current = Database::new("app").table(
            Table::new("T")
                .column(Column::new("a", TypeCode::Integer))
                .column(Column::new("c", TypeCode::Integer)),
        );
        let desired = Database::new("app").table(
            Table::new("T")
                .column(Column::new("a", TypeCode::Integer))
                .column(Column::new("b", TypeCode::Integer))
                .column(Column::new("c", TypeCode::Integer)),
        );
        let (script, tracked) = plan(&current, &desired).unwrap();
        assert_eq!(
            script.statements(),
            [
                "ALTER TABLE T ADD b INTEGER",
                "ALTER TABLE T ALTER b POSITION 2",
            ]
        );
        // order preservation: the tracked model matches the desired order
        let table = tracked.find_table("T", false).unwrap();
        let order: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn leading_addition_moves_to_position_one() {
        let current = Database::new("app")
            .table(Table::new("T").column(Column::new("a", TypeCode::Integer)));
        let desired = Database::new("app").table(
            Table::new("T")
                .column(Column::new("first", TypeCode::Integer))
                .column(Column::new("a", TypeCode::Integer)),
        );
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(
            script.statements(),
            [
                "ALTER TABLE T ADD first INTEGER",
                "ALTER TABLE T ALTER first POSITION 1",
            ]
        );
    }

    #[test]
    fn primary_key_added_alone_is_claimed() {
        let current = Database::new("app")
            .table(Table::new("T").column(Column::new("id", TypeCode::Integer).not_null()));
        let desired = Database::new("app")
            .table(Table::new("T").column(Column::new("id", TypeCode::Integer).primary_key()));
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(script.statements(), ["ALTER TABLE T ADD PRIMARY KEY (id)"]);
    }

    #[test]
    fn primary_key_deferred_when_its_column_is_added() {
        let current = Database::new("app")
            .table(Table::new("T").column(Column::new("a", TypeCode::Integer)));
        let desired = Database::new("app").table(
            Table::new("T")
                .column(Column::new("a", TypeCode::Integer))
                .column(Column::new("id", TypeCode::Integer).primary_key()),
        );
        let (script, _) = plan(&current, &desired).unwrap();
        // the claim pass leaves both to the generic engine so the column
        // lands before the key
        assert_eq!(
            script.statements(),
            [
                "ALTER TABLE T ADD id INTEGER NOT NULL",
                "ALTER TABLE T ADD PRIMARY KEY (id)",
            ]
        );
    }

    #[test]
    fn primary_key_removal_is_unsupported() {
        let current = Database::new("app")
            .table(Table::new("T").column(Column::new("id", TypeCode::Integer).primary_key()));
        let desired = Database::new("app")
            .table(Table::new("T").column(Column::new("id", TypeCode::Integer).not_null()));
        let err = plan(&current, &desired).unwrap_err();
        match err {
            DriftError::UnsupportedChange { dialect, kind, .. } => {
                assert_eq!(dialect, "firebird");
                assert_eq!(kind, "remove primary key");
            }
            other => panic!("expected UnsupportedChange, got {other:?}"),
        }
    }

    #[test]
    fn primary_key_column_removal_is_unsupported() {
        let current = Database::new("app").table(
            Table::new("T")
                .column(Column::new("id", TypeCode::Integer).primary_key())
                .column(Column::new("name", TypeCode::Varchar(50))),
        );
        let desired = Database::new("app")
            .table(Table::new("T").column(Column::new("name", TypeCode::Varchar(50))));
        let err = plan(&current, &desired).unwrap_err();
        match err {
            DriftError::UnsupportedChange { kind, column, .. } => {
                assert_eq!(kind, "remove column");
                assert_eq!(column.as_deref(), Some("id"));
            }
            other => panic!("expected UnsupportedChange, got {other:?}"),
        }
    }

    #[test]
    fn type_change_is_altered_in_place() {
        let current = Database::new("app")
            .table(Table::new("T").column(Column::new("v", TypeCode::Varchar(20))));
        let desired = Database::new("app")
            .table(Table::new("T").column(Column::new("v", TypeCode::Varchar(80))));
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(
            script.statements(),
            ["ALTER TABLE T ALTER COLUMN v TYPE VARCHAR(80)"]
        );
    }

    #[test]
    fn create_table_emits_companion_objects() {
        let current = Database::new("app");
        let desired = Database::new("app").table(
            Table::new("orders")
                .column(Column::new("id", TypeCode::Bigint).primary_key().auto_increment())
                .column(Column::new("total", TypeCode::Decimal(10, 2)).not_null()),
        );
        let (script, _) = plan(&current, &desired).unwrap();
        let statements = script.statements();
        assert!(statements[0].starts_with("CREATE TABLE orders ("));
        assert!(statements[0].contains("id NUMERIC(18,0) NOT NULL"));
        assert!(statements[0].contains("PRIMARY KEY (id)"));
        assert_eq!(statements[1], "CREATE GENERATOR gen_orders_id");
        assert!(statements[2].starts_with("CREATE TRIGGER trg_orders_id FOR orders"));
    }

    #[test]
    fn drop_table_drops_companion_objects_first() {
        let current = Database::new("app").table(
            Table::new("orders")
                .column(Column::new("id", TypeCode::Bigint).primary_key().auto_increment()),
        );
        let desired = Database::new("app");
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(
            script.statements(),
            [
                "DROP TRIGGER trg_orders_id",
                "DROP GENERATOR gen_orders_id",
                "DROP TABLE orders",
            ]
        );
    }

    #[test]
    fn generated_names_are_truncated_to_31_characters() {
        let d = dialect();
        let column = Column::new("a_rather_long_column_name", TypeCode::Integer);
        let name = d.generator_name("a_fairly_long_table_name", &column);
        assert!(name.chars().count() <= 31);
        assert!(name.starts_with("gen_a_fairly_long_table_name"));
    }

    #[test]
    fn identity_retrieval_reads_the_generator() {
        let d = dialect();
        let table = Table::new("T").column(Column::new("id", TypeCode::Integer).auto_increment());
        assert_eq!(
            d.select_last_insert_sql(&table),
            Some("SELECT GEN_ID(gen_T_id, 0) FROM RDB$DATABASE".to_string())
        );
        assert_eq!(d.select_last_insert_sql(&Table::new("plain")), None);
    }

    #[test]
    fn drop_index_has_no_on_clause() {
        let current = Database::new("app").table(
            Table::new("T")
                .column(Column::new("a", TypeCode::Integer))
                .index(Index::new("idx1").column("a")),
        );
        let desired = Database::new("app")
            .table(Table::new("T").column(Column::new("a", TypeCode::Integer)));
        let (script, _) = plan(&current, &desired).unwrap();
        assert_eq!(script.statements(), ["DROP INDEX idx1"]);
    }
}
