//! Per-dialect capability descriptors.
//!
//! A [`Capabilities`] value describes what DDL operations a platform can
//! express directly. The emission engine consults it to decide whether a
//! change can be emitted in place or must fall back to table rebuild;
//! dialect strategies consult it inside their own claim logic.

/// How a dialect realizes auto-increment columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrementStrategy {
    /// An inline identity clause in the column definition.
    NativeIdentity,
    /// Emulated with a sequence object plus a before-insert trigger.
    SequenceAndTrigger,
    /// Not supported at all.
    None,
}

/// Capability flags and limits for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Can relocate an existing column within a table.
    pub reorder_columns: bool,
    /// Can add a column at an arbitrary position (not only appended).
    pub add_column_in_middle: bool,
    /// Can change a column's type in place.
    pub alter_column_type: bool,
    /// Can drop columns in place.
    pub drop_columns: bool,
    /// Can drop a column that is part of the primary key.
    pub drop_primary_key_column: bool,
    /// Primary-key constraints are named and can be dropped by name.
    pub named_primary_keys: bool,
    /// Auto-increment realization.
    pub auto_increment: AutoIncrementStrategy,
    /// Maximum identifier length; generated names are truncated to fit.
    pub max_identifier_length: usize,
    /// Reserved words that must be quoted even outside delimited mode.
    pub reserved_words: &'static [&'static str],
}

impl Capabilities {
    /// A descriptor with every structural capability disabled. Dialects
    /// with this profile route all table alterations through rebuild.
    pub const NONE: Self = Self {
        reorder_columns: false,
        add_column_in_middle: false,
        alter_column_type: false,
        drop_columns: false,
        drop_primary_key_column: false,
        named_primary_keys: false,
        auto_increment: AutoIncrementStrategy::None,
        max_identifier_length: 128,
        reserved_words: &[],
    };

    /// A permissive ANSI-style descriptor where every alteration is
    /// expressible in place.
    pub const ANSI: Self = Self {
        reorder_columns: true,
        add_column_in_middle: true,
        alter_column_type: true,
        drop_columns: true,
        drop_primary_key_column: true,
        named_primary_keys: true,
        auto_increment: AutoIncrementStrategy::NativeIdentity,
        max_identifier_length: 128,
        reserved_words: &[],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_profiles() {
        assert!(!Capabilities::NONE.alter_column_type);
        assert_eq!(Capabilities::NONE.auto_increment, AutoIncrementStrategy::None);
        assert!(Capabilities::ANSI.drop_columns);
        assert_eq!(
            Capabilities::ANSI.auto_increment,
            AutoIncrementStrategy::NativeIdentity
        );
    }
}
