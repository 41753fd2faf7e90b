//! Storage Layer - SQLite-backed record store
//!
//! One table per sheet, named by the schema registry:
//! - support_data_<sheet>(id, fio, number, date, ..., status[, memo])
//!
//! The store owns the only connection. Every write is its own transaction.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbLocation, RecordStore};
