//! Error types for model validation, diffing and DDL emission.
//!
//! Everything here is detected at migration compile time; statement-level
//! failures against a live server belong to the execution collaborator
//! and are never retried by this crate.

/// Errors surfaced while validating models, diffing, or emitting DDL.
#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    /// The active dialect cannot express a change and table rebuild is
    /// not available either. Emission fails atomically; no partial script
    /// is produced.
    #[error("dialect `{dialect}` cannot express {kind} on table `{table}`{}", .column.as_deref().map(|c| format!(" (column `{c}`)")).unwrap_or_default())]
    UnsupportedChange {
        /// Dialect that rejected the change.
        dialect: &'static str,
        /// Table the change targets.
        table: String,
        /// Column the change targets, if column-scoped.
        column: Option<String>,
        /// Kind of change, e.g. "remove primary key".
        kind: &'static str,
    },

    /// An identifier resolves to more than one object under the current
    /// identifier mode (e.g. a case-fold collision with delimited
    /// identifiers off).
    #[error("identifier `{name}` is ambiguous in {scope} under the current identifier mode")]
    AmbiguousIdentity {
        /// The colliding identifier.
        name: String,
        /// Where the collision occurred, e.g. "table `users`".
        scope: String,
    },

    /// A model violates an internal invariant (dangling index or foreign
    /// key reference, non-numeric auto-increment column, unknown table
    /// during change application).
    #[error("model inconsistency: {0}")]
    ModelInconsistency(String),
}

/// Result type for diff and emission operations.
pub type Result<T> = std::result::Result<T, DriftError>;
