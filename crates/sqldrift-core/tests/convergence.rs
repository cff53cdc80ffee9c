//! End-to-end convergence: for a range of (current, desired) model
//! pairs, emitting the diffed change set must leave the tracked current
//! model structurally equal to the desired one, and the produced script
//! must be reproducible.

use sqldrift_core::{
    diff_database, Capabilities, Column, Database, DdlEmitter, Dialect, DefaultValue, ForeignKey,
    Index, Table, TypeCode,
};

#[derive(Debug)]
struct Generic;

impl Dialect for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn capabilities(&self) -> &Capabilities {
        &Capabilities::ANSI
    }

    fn delimited_identifiers(&self) -> bool {
        false
    }

    fn native_type(&self, column: &Column) -> String {
        match column.type_code {
            TypeCode::Smallint => "SMALLINT".to_string(),
            TypeCode::Integer => "INTEGER".to_string(),
            TypeCode::Bigint => "BIGINT".to_string(),
            TypeCode::Real => "REAL".to_string(),
            TypeCode::Double => "DOUBLE PRECISION".to_string(),
            TypeCode::Decimal(p, s) => format!("DECIMAL({p},{s})"),
            TypeCode::Numeric(p, s) => format!("NUMERIC({p},{s})"),
            TypeCode::Char(n) => format!("CHAR({n})"),
            TypeCode::Varchar(n) => format!("VARCHAR({n})"),
            TypeCode::Binary(n) => format!("BINARY({n})"),
            TypeCode::Varbinary(n) => format!("VARBINARY({n})"),
            TypeCode::Blob => "BLOB".to_string(),
            TypeCode::Clob => "CLOB".to_string(),
            TypeCode::Boolean => "BOOLEAN".to_string(),
            TypeCode::Date => "DATE".to_string(),
            TypeCode::Time => "TIME".to_string(),
            TypeCode::Timestamp => "TIMESTAMP".to_string(),
        }
    }
}

fn assert_converges(current: &Database, desired: &Database) {
    let dialect = Generic;
    let changes = diff_database(current, desired, false).expect("diff");
    let mut tracked = current.clone();
    DdlEmitter::new(&dialect)
        .emit(&mut tracked, desired, changes)
        .expect("emit");

    assert_eq!(tracked.tables.len(), desired.tables.len());
    for table in &desired.tables {
        let result = tracked
            .find_table(&table.name, false)
            .unwrap_or_else(|| panic!("table `{}` missing after emission", table.name));
        assert_eq!(result.columns, table.columns, "columns of `{}`", table.name);
        assert_eq!(result.indexes, table.indexes, "indexes of `{}`", table.name);
        assert_eq!(
            result.foreign_keys, table.foreign_keys,
            "foreign keys of `{}`",
            table.name
        );
    }
}

fn invoices() -> Table {
    Table::new("invoices")
        .column(Column::new("id", TypeCode::Bigint).primary_key().auto_increment())
        .column(Column::new("customer", TypeCode::Varchar(120)).not_null())
        .column(
            Column::new("paid", TypeCode::Boolean).default_value(DefaultValue::Bool(false)),
        )
        .index(Index::new("idx_invoices_customer").column("customer"))
}

#[test]
fn identical_models_emit_nothing() {
    let model = Database::new("app").table(invoices());
    let changes = diff_database(&model, &model, false).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn table_creation_converges() {
    let current = Database::new("app");
    let desired = Database::new("app").table(invoices());
    assert_converges(&current, &desired);
}

#[test]
fn table_removal_converges() {
    let current = Database::new("app").table(invoices());
    let desired = Database::new("app");
    assert_converges(&current, &desired);
}

#[test]
fn column_additions_preserve_desired_order() {
    let current = Database::new("app").table(
        Table::new("t")
            .column(Column::new("a", TypeCode::Integer))
            .column(Column::new("d", TypeCode::Integer)),
    );
    let desired = Database::new("app").table(
        Table::new("t")
            .column(Column::new("a", TypeCode::Integer))
            .column(Column::new("b", TypeCode::Integer))
            .column(Column::new("c", TypeCode::Integer))
            .column(Column::new("d", TypeCode::Integer))
            .column(Column::new("e", TypeCode::Integer)),
    );
    assert_converges(&current, &desired);
}

#[test]
fn mixed_alterations_converge() {
    let current = Database::new("app").table(
        Table::new("events")
            .column(Column::new("id", TypeCode::Integer).primary_key())
            .column(Column::new("kind", TypeCode::Varchar(20)).not_null())
            .column(Column::new("legacy", TypeCode::Clob)),
    );
    let desired = Database::new("app").table(
        Table::new("events")
            .column(Column::new("id", TypeCode::Bigint).primary_key())
            .column(Column::new("occurred_at", TypeCode::Timestamp).not_null())
            .column(Column::new("kind", TypeCode::Varchar(40)))
            .index(Index::new("idx_events_kind").column("kind")),
    );
    assert_converges(&current, &desired);
}

#[test]
fn primary_key_rewrite_converges() {
    let current = Database::new("app").table(
        Table::new("t")
            .column(Column::new("id", TypeCode::Bigint).primary_key())
            .column(Column::new("code", TypeCode::Varchar(16)).not_null()),
    );
    let desired = Database::new("app").table(
        Table::new("t")
            .column(Column::new("id", TypeCode::Bigint).not_null())
            .column(Column::new("code", TypeCode::Varchar(16)).primary_key()),
    );
    assert_converges(&current, &desired);
}

#[test]
fn cross_table_foreign_keys_converge() {
    let current = Database::new("app").table(
        Table::new("accounts").column(Column::new("id", TypeCode::Bigint).primary_key()),
    );
    let desired = Database::new("app")
        .table(Table::new("accounts").column(Column::new("id", TypeCode::Bigint).primary_key()))
        .table(
            Table::new("transfers")
                .column(Column::new("id", TypeCode::Bigint).primary_key())
                .column(Column::new("account_id", TypeCode::Bigint).not_null())
                .foreign_key(
                    ForeignKey::new("fk_transfers_account", "accounts")
                        .reference("account_id", "id"),
                ),
        );
    assert_converges(&current, &desired);
}

#[test]
fn emission_is_reproducible() {
    let dialect = Generic;
    let current = Database::new("app").table(invoices());
    let desired = Database::new("app").table(
        invoices().column(Column::new("currency", TypeCode::Char(3)).not_null()),
    );

    let first = {
        let changes = diff_database(&current, &desired, false).unwrap();
        let mut tracked = current.clone();
        DdlEmitter::new(&dialect)
            .emit(&mut tracked, &desired, changes)
            .unwrap()
            .to_string()
    };
    let second = {
        let changes = diff_database(&current, &desired, false).unwrap();
        let mut tracked = current.clone();
        DdlEmitter::new(&dialect)
            .emit(&mut tracked, &desired, changes)
            .unwrap()
            .to_string()
    };
    assert_eq!(first, second);
}
