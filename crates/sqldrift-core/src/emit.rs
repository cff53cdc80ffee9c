//! Capability-aware DDL emission.
//!
//! [`DdlEmitter`] walks an ordered change set in three phases: table
//! creations, per-table alterations, table removals. For each altered
//! table the active dialect first gets a chance to claim changes it can
//! express natively; whatever remains is emitted through the generic
//! statement hooks, or collapsed into a full table rebuild when the
//! capability descriptor rules direct emission out. A change neither
//! claimable, expressible nor rebuildable fails the whole run — the
//! engine never drops a change silently or returns a partial script.

use std::fmt;

use tracing::{debug, info};

use crate::capability::AutoIncrementStrategy;
use crate::change::Change;
use crate::dialect::Dialect;
use crate::error::{DriftError, Result};
use crate::model::{names_match, Database, Table};

/// Receives emitted statements one at a time.
pub trait StatementSink {
    /// Accepts one statement, without its terminator.
    fn statement(&mut self, sql: &str);
}

impl StatementSink for Vec<String> {
    fn statement(&mut self, sql: &str) {
        self.push(sql.to_string());
    }
}

/// An ordered DDL script produced by one emission run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlScript {
    statements: Vec<String>,
    terminator: &'static str,
}

impl SqlScript {
    fn new(statements: Vec<String>, terminator: &'static str) -> Self {
        Self {
            statements,
            terminator,
        }
    }

    /// The statements, in emission order, without terminators.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Feeds every statement into the sink, in order.
    pub fn write_to(&self, sink: &mut dyn StatementSink) {
        for statement in &self.statements {
            sink.statement(statement);
        }
    }
}

impl fmt::Display for SqlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}{}", self.terminator)?;
        }
        Ok(())
    }
}

/// Mutable state handed to dialect claim hooks: the current model being
/// tracked, the desired model, and the statement buffer.
pub struct EmitContext<'a> {
    current: &'a mut Database,
    desired: &'a Database,
    delimited: bool,
    statements: Vec<String>,
}

impl<'a> EmitContext<'a> {
    fn new(current: &'a mut Database, desired: &'a Database, delimited: bool) -> Self {
        Self {
            current,
            desired,
            delimited,
            statements: Vec::new(),
        }
    }

    /// The current model, updated as changes are applied.
    #[must_use]
    pub fn current(&self) -> &Database {
        self.current
    }

    /// The desired model.
    #[must_use]
    pub fn desired(&self) -> &Database {
        self.desired
    }

    /// The identifier mode in effect.
    #[must_use]
    pub fn delimited_identifiers(&self) -> bool {
        self.delimited
    }

    /// Buffers one statement.
    pub fn statement(&mut self, sql: impl Into<String>) {
        let sql = sql.into();
        debug!(sql = %sql, "emit");
        self.statements.push(sql);
    }

    /// Applies a change to the current model.
    pub fn apply(&mut self, change: &Change) -> Result<()> {
        change.apply(self.current, self.delimited)
    }

    fn replace_table(&mut self, name: &str, table: Table) -> Result<()> {
        let delimited = self.delimited;
        let slot = self
            .current
            .tables
            .iter_mut()
            .find(|t| names_match(&t.name, name, delimited))
            .ok_or_else(|| DriftError::ModelInconsistency(format!("unknown table `{name}`")))?;
        *slot = table;
        Ok(())
    }
}

/// A table's pending changes during the claim phase: an ordered sequence
/// plus a claimed-marker set. Dialects never remove entries while
/// iterating; claiming marks them, and the engine takes the residual
/// sequence afterwards.
pub struct PendingChanges {
    items: Vec<Change>,
    claimed: Vec<bool>,
}

impl PendingChanges {
    fn new(items: Vec<Change>) -> Self {
        let claimed = vec![false; items.len()];
        Self { items, claimed }
    }

    /// Number of changes, claimed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set holds no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The change at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> &Change {
        &self.items[index]
    }

    /// Whether the change at `index` has been claimed.
    #[must_use]
    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed[index]
    }

    /// Marks the change at `index` as claimed.
    pub fn claim(&mut self, index: usize) {
        self.claimed[index] = true;
    }

    fn residual(self) -> Vec<Change> {
        self.items
            .into_iter()
            .zip(self.claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(change, _)| change)
            .collect()
    }
}

/// The generic, capability-aware emission engine.
pub struct DdlEmitter<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> DdlEmitter<'a> {
    /// Creates an emitter for the given dialect.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Compiles the change set to DDL, mutating `current` in step with
    /// each emitted change. Fails atomically: on error no script is
    /// produced and nothing reaches a sink.
    pub fn emit(
        &self,
        current: &mut Database,
        desired: &Database,
        changes: Vec<Change>,
    ) -> Result<SqlScript> {
        let delimited = self.dialect.delimited_identifiers();
        let mut ctx = EmitContext::new(current, desired, delimited);

        let mut creations: Vec<Change> = Vec::new();
        let mut grouped: Vec<(String, Vec<Change>)> = Vec::new();
        let mut removals: Vec<Change> = Vec::new();

        for change in changes {
            match change {
                Change::AddTable(_) => creations.push(change),
                Change::RemoveTable(_) => removals.push(change),
                other => {
                    let name = other.table_name().to_string();
                    match grouped
                        .iter_mut()
                        .find(|(table, _)| names_match(table, &name, delimited))
                    {
                        Some((_, list)) => list.push(other),
                        None => grouped.push((name, vec![other])),
                    }
                }
            }
        }

        // Creations first; foreign keys of the new tables only after
        // every create, so references between them resolve.
        let mut deferred_fks: Vec<String> = Vec::new();
        for change in &creations {
            if let Change::AddTable(add) = change {
                self.emit_create_table(&mut ctx, &add.table, &mut deferred_fks);
                ctx.apply(change)?;
            }
        }
        for sql in deferred_fks {
            ctx.statement(sql);
        }

        for (table, table_changes) in grouped {
            self.process_table_changes(&mut ctx, &table, table_changes)?;
        }

        for change in &removals {
            if let Change::RemoveTable(remove) = change {
                self.emit_drop_table(&mut ctx, &remove.table);
                ctx.apply(change)?;
            }
        }

        Ok(SqlScript::new(
            ctx.statements,
            self.dialect.statement_terminator(),
        ))
    }

    fn sequence_auto_increment(&self) -> bool {
        matches!(
            self.dialect.capabilities().auto_increment,
            AutoIncrementStrategy::SequenceAndTrigger
        )
    }

    fn emit_create_table(
        &self,
        ctx: &mut EmitContext<'_>,
        table: &Table,
        deferred_fks: &mut Vec<String>,
    ) {
        ctx.statement(self.dialect.create_table_sql(table));
        if self.sequence_auto_increment() {
            for column in table.auto_increment_columns() {
                for sql in self.dialect.auto_increment_create_sql(table, column) {
                    ctx.statement(sql);
                }
            }
        }
        for index in &table.indexes {
            ctx.statement(self.dialect.create_index_sql(&table.name, index));
        }
        for foreign_key in &table.foreign_keys {
            deferred_fks.push(self.dialect.add_foreign_key_sql(&table.name, foreign_key));
        }
    }

    fn emit_drop_table(&self, ctx: &mut EmitContext<'_>, table: &Table) {
        if self.sequence_auto_increment() {
            for column in table.auto_increment_columns() {
                for sql in self.dialect.auto_increment_drop_sql(table, column) {
                    ctx.statement(sql);
                }
            }
        }
        ctx.statement(self.dialect.drop_table_sql(table));
    }

    /// Claim phase, then generic fallback, then rebuild, for one table.
    fn process_table_changes(
        &self,
        ctx: &mut EmitContext<'_>,
        table: &str,
        changes: Vec<Change>,
    ) -> Result<()> {
        let mut pending = PendingChanges::new(changes);
        self.dialect.claim_table_changes(ctx, &mut pending)?;
        let residual = pending.residual();
        if residual.is_empty() {
            return Ok(());
        }

        match residual.iter().find(|c| !self.directly_expressible(c)) {
            None => {
                for change in &residual {
                    self.emit_direct(ctx, change)?;
                    ctx.apply(change)?;
                }
                Ok(())
            }
            Some(blocked) => {
                let rebuildable = self.dialect.supports_table_rebuild()
                    && !referenced_by_foreign_keys(ctx.current(), table, ctx.delimited);
                if rebuildable {
                    info!(table = %table, "falling back to table rebuild");
                    self.rebuild_table(ctx, table)
                } else {
                    Err(DriftError::UnsupportedChange {
                        dialect: self.dialect.name(),
                        table: blocked.table_name().to_string(),
                        column: blocked.column_name().map(str::to_string),
                        kind: blocked.kind(),
                    })
                }
            }
        }
    }

    /// Whether the generic statement hooks can express this change under
    /// the dialect's capability descriptor.
    fn directly_expressible(&self, change: &Change) -> bool {
        let caps = self.dialect.capabilities();
        match change {
            Change::AddColumn(c) => {
                !c.column.auto_increment && (c.at_end || caps.add_column_in_middle)
            }
            Change::RemoveColumn(c) => {
                caps.drop_columns && (!c.column.primary_key || caps.drop_primary_key_column)
            }
            Change::ModifyColumn(c) => {
                c.old_column.auto_increment == c.new_column.auto_increment
                    && (c.old_column.type_code == c.new_column.type_code
                        || caps.alter_column_type)
            }
            Change::RemovePrimaryKey(_) => caps.named_primary_keys,
            _ => true,
        }
    }

    fn emit_direct(&self, ctx: &mut EmitContext<'_>, change: &Change) -> Result<()> {
        match change {
            Change::AddColumn(c) => {
                ctx.statement(self.dialect.add_column_sql(c));
            }
            Change::RemoveColumn(c) => {
                if c.column.auto_increment && self.sequence_auto_increment() {
                    let drops = {
                        let table = ctx
                            .current()
                            .find_table(&c.table, ctx.delimited)
                            .ok_or_else(|| {
                                DriftError::ModelInconsistency(format!(
                                    "unknown table `{}`",
                                    c.table
                                ))
                            })?;
                        self.dialect.auto_increment_drop_sql(table, &c.column)
                    };
                    for sql in drops {
                        ctx.statement(sql);
                    }
                }
                ctx.statement(self.dialect.drop_column_sql(&c.table, &c.column));
            }
            Change::ModifyColumn(c) => {
                if c.old_column.type_code != c.new_column.type_code {
                    ctx.statement(self.dialect.alter_column_type_sql(&c.table, &c.new_column));
                }
                if c.old_column.nullable != c.new_column.nullable {
                    ctx.statement(
                        self.dialect
                            .alter_column_nullable_sql(&c.table, &c.new_column),
                    );
                }
                if c.old_column.default != c.new_column.default {
                    ctx.statement(
                        self.dialect
                            .alter_column_default_sql(&c.table, &c.new_column),
                    );
                }
            }
            Change::AddPrimaryKey(c) => {
                ctx.statement(self.dialect.add_primary_key_sql(&c.table, &c.columns));
            }
            Change::RemovePrimaryKey(c) => {
                ctx.statement(self.dialect.drop_primary_key_sql(&c.table));
            }
            Change::AddForeignKey(c) => {
                ctx.statement(self.dialect.add_foreign_key_sql(&c.table, &c.foreign_key));
            }
            Change::RemoveForeignKey(c) => {
                ctx.statement(self.dialect.drop_foreign_key_sql(&c.table, &c.foreign_key));
            }
            Change::AddIndex(c) => {
                ctx.statement(self.dialect.create_index_sql(&c.table, &c.index));
            }
            Change::RemoveIndex(c) => {
                ctx.statement(self.dialect.drop_index_sql(&c.table, &c.index));
            }
            Change::AddTable(_) | Change::RemoveTable(_) => {}
        }
        Ok(())
    }

    /// The correctness backstop: replace the table wholesale. Creates a
    /// temporary table with the desired structure, copies the common
    /// columns over with cast expressions, drops the original and renames
    /// the temporary into place.
    fn rebuild_table(&self, ctx: &mut EmitContext<'_>, table: &str) -> Result<()> {
        let delimited = ctx.delimited;
        let desired_table = ctx
            .desired()
            .find_table(table, delimited)
            .ok_or_else(|| {
                DriftError::ModelInconsistency(format!("unknown table `{table}` in desired model"))
            })?
            .clone();
        let current_table = ctx
            .current()
            .find_table(table, delimited)
            .ok_or_else(|| DriftError::ModelInconsistency(format!("unknown table `{table}`")))?
            .clone();

        let temp_name = self.dialect.temp_table_name(&desired_table.name);
        let mut temp = desired_table.clone();
        temp.name = temp_name.clone();
        temp.indexes.clear();
        temp.foreign_keys.clear();
        ctx.statement(self.dialect.create_table_sql(&temp));

        let mut insert_columns = Vec::new();
        let mut select_exprs = Vec::new();
        for target in &desired_table.columns {
            if let Some(source) = current_table.find_column(&target.name, delimited) {
                insert_columns.push(self.dialect.quote_identifier(&target.name));
                select_exprs.push(self.dialect.cast_expression(source, target));
            }
        }
        if !insert_columns.is_empty() {
            ctx.statement(format!(
                "INSERT INTO {} ({}) SELECT {} FROM {}",
                self.dialect.quote_identifier(&temp_name),
                insert_columns.join(", "),
                select_exprs.join(", "),
                self.dialect.quote_identifier(&current_table.name),
            ));
        }

        self.emit_drop_table(ctx, &current_table);
        ctx.statement(
            self.dialect
                .rename_table_sql(&temp_name, &desired_table.name),
        );

        if self.sequence_auto_increment() {
            for column in desired_table.auto_increment_columns() {
                for sql in self.dialect.auto_increment_create_sql(&desired_table, column) {
                    ctx.statement(sql);
                }
            }
        }
        for index in &desired_table.indexes {
            ctx.statement(self.dialect.create_index_sql(&desired_table.name, index));
        }
        for foreign_key in &desired_table.foreign_keys {
            ctx.statement(
                self.dialect
                    .add_foreign_key_sql(&desired_table.name, foreign_key),
            );
        }

        ctx.replace_table(table, desired_table)
    }
}

/// Whether any other table holds a foreign key into `table`. Rebuilding
/// a referenced table would corrupt referential integrity, so the engine
/// refuses and reports the change as unsupported instead.
fn referenced_by_foreign_keys(db: &Database, table: &str, delimited: bool) -> bool {
    db.tables
        .iter()
        .filter(|other| !names_match(&other.name, table, delimited))
        .flat_map(|other| other.foreign_keys.iter())
        .any(|fk| names_match(&fk.referenced_table, table, delimited))
}
