//! # Supportbook - support desk record book
//!
//! Per-token transfer and refund tracking for a crypto support desk.
//!
//! Supportbook provides:
//! - A schema registry routing each sheet (token) to its own table and column set
//! - A query builder emitting parameterized SQL against registry-vetted identifiers
//! - A single-connection record store with commit-or-rollback writes
//! - View logic for the entry form, the pending-returns list and the search grid
//! - The shared, append-only list of refund reasons

pub mod sheet;
pub mod record;
pub mod query;
pub mod storage;
pub mod views;
pub mod reasons;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use sheet::{ColumnDef, SchemaRegistry, Sheet, SheetSchema};
pub use record::{ColumnValues, Record, Status};
pub use query::{Direction, Filter, OrderBy, Statement};
pub use storage::{DbLocation, RecordStore};
pub use reasons::ReasonList;

/// Result type alias for Supportbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Supportbook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No table configured for sheet '{0}'")]
    UnknownSheet(String),

    #[error("Table '{0}' is not a known sheet table")]
    UnknownTable(String),

    #[error("Column '{column}' does not exist in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Please fill in the following fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Column set does not match table {table} (missing: [{}], unexpected: [{}])", .missing.join(", "), .unexpected.join(", "))]
    ColumnMismatch {
        table: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Nothing to update")]
    EmptyUpdate,

    #[error("Invalid status '{0}' (expected 'return not done' or 'return done')")]
    InvalidStatus(String),

    #[error("Database is not connected")]
    NotConnected,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classes of failure, used by front ends to decide how to report them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown sheet, table or column; nothing was touched
    Configuration,
    /// Rejected input; nothing was touched
    Validation,
    /// The database or filesystem failed; in-flight writes were rolled back
    Backend,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownSheet(_)
            | Error::UnknownTable(_)
            | Error::UnknownColumn { .. }
            | Error::Config(_) => ErrorKind::Configuration,
            Error::MissingFields(_)
            | Error::ColumnMismatch { .. }
            | Error::EmptyUpdate
            | Error::InvalidStatus(_) => ErrorKind::Validation,
            Error::NotConnected | Error::Storage(_) | Error::Io(_) | Error::Json(_) => {
                ErrorKind::Backend
            }
        }
    }
}
