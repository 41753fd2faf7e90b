//! SQLite storage implementation

use std::fmt;
use std::path::{Path, PathBuf};
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, error, info};
use crate::{Result, Error};
use crate::query::{self, Filter, OrderBy, Statement};
use crate::record::{ColumnValues, Record};
use crate::sheet::{SchemaRegistry, Sheet};
use super::schema;

/// Where the record database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database; contents are lost on close
    Memory,
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::File(path) => write!(f, "{}", path.display()),
            DbLocation::Memory => write!(f, ":memory:"),
        }
    }
}

/// Single-connection store for sheet records.
///
/// Disconnected until [`connect`](Self::connect) succeeds; disconnected again
/// after [`close`](Self::close). Nothing reconnects on its own: callers use
/// [`ensure_connected`](Self::ensure_connected) before an action.
pub struct RecordStore<'r> {
    registry: &'r SchemaRegistry,
    location: DbLocation,
    conn: Option<Connection>,
}

impl<'r> RecordStore<'r> {
    /// Create a disconnected store
    pub fn new(registry: &'r SchemaRegistry, location: DbLocation) -> Self {
        Self { registry, location, conn: None }
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(registry: &'r SchemaRegistry, path: &Path) -> Result<Self> {
        let mut store = Self::new(registry, DbLocation::File(path.to_path_buf()));
        store.connect()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(registry: &'r SchemaRegistry) -> Result<Self> {
        let mut store = Self::new(registry, DbLocation::Memory);
        store.connect()?;
        Ok(store)
    }

    // ========== Connection Lifecycle ==========

    /// Establish the session and create any missing sheet tables
    pub fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            debug!("Already connected to {}", self.location);
            return Ok(());
        }

        let opened = match &self.location {
            DbLocation::File(path) => Connection::open(path),
            DbLocation::Memory => Connection::open_in_memory(),
        };
        let conn = opened.inspect_err(|e| error!("Failed to connect to {}: {}", self.location, e))?;

        for stmt in schema::all_schema_statements(self.registry) {
            conn.execute(&stmt, [])?;
        }

        self.conn = Some(conn);
        info!("Database connected: {}", self.location);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Reconnect if the session was closed
    pub fn ensure_connected(&mut self) -> Result<()> {
        if !self.is_connected() {
            info!("Not connected, reconnecting to {}", self.location);
            self.connect()?;
        }
        Ok(())
    }

    /// Release the session; a no-op when already closed
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| e)?;
            info!("Database connection closed");
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::NotConnected)
    }

    /// Only sheets handed out by this store's registry may reach SQL
    fn vet(&self, sheet: &Sheet) -> Result<()> {
        let registered = self.registry.by_table(&sheet.table)?;
        if registered != sheet {
            return Err(Error::UnknownTable(sheet.table.clone()));
        }
        Ok(())
    }

    /// Run one statement in its own transaction, returning (rows, last rowid)
    fn execute_write(&mut self, stmt: &Statement) -> Result<(usize, i64)> {
        let conn = self.conn.as_mut().ok_or(Error::NotConnected)?;
        debug!("{}", stmt.sql);

        let tx = conn.transaction()?;
        match tx.execute(&stmt.sql, params_from_iter(stmt.params.iter())) {
            Ok(changed) => {
                let rowid = tx.last_insert_rowid();
                tx.commit()?;
                Ok((changed, rowid))
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!("Rollback failed: {}", rollback_err);
                }
                error!("Write failed, rolled back: {}", e);
                Err(e.into())
            }
        }
    }

    // ========== Record Operations ==========

    /// Insert a full record, returning its id
    pub fn insert(&mut self, sheet: &Sheet, values: &ColumnValues) -> Result<i64> {
        self.vet(sheet)?;
        values.check_status()?;
        let stmt = query::insert(sheet, values)?;

        let (_, id) = self.execute_write(&stmt)?;
        info!("Record {} added to {}", id, sheet.table);
        Ok(id)
    }

    /// Update some columns of a record, returning the number of rows changed
    pub fn update(&mut self, sheet: &Sheet, id: i64, values: &ColumnValues) -> Result<usize> {
        self.vet(sheet)?;
        values.check_status()?;
        let stmt = query::update(sheet, id, values)?;

        let (changed, _) = self.execute_write(&stmt)?;
        info!("Record id={} in {} updated ({} row(s))", id, sheet.table, changed);
        Ok(changed)
    }

    /// Delete a record; a missing id changes nothing
    pub fn delete(&mut self, sheet: &Sheet, id: i64) -> Result<usize> {
        self.vet(sheet)?;
        let stmt = query::delete(sheet, id);

        let (changed, _) = self.execute_write(&stmt)?;
        info!("Record id={} in {} deleted ({} row(s))", id, sheet.table, changed);
        Ok(changed)
    }

    /// Select records with an optional equality filter and ordering
    pub fn select(&self, sheet: &Sheet, filter: Option<&Filter>, order: Option<&OrderBy>) -> Result<Vec<Record>> {
        self.vet(sheet)?;
        let query = query::select(sheet, filter, order)?;
        let conn = self.conn()?;
        debug!("{}", query.sql);

        let columns = sheet.schema.column_names();
        let mut stmt = conn.prepare(&query.sql)?;
        let records = stmt
            .query_map(params_from_iter(query.params.iter()), |row| row_to_record(row, &columns))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Get a record by id
    pub fn fetch(&self, sheet: &Sheet, id: i64) -> Result<Option<Record>> {
        let mut records = self.select(sheet, Some(&Filter::id(id)), None)?;
        Ok(records.pop())
    }

    /// All records, most recent first
    pub fn fetch_all(&self, sheet: &Sheet) -> Result<Vec<Record>> {
        self.select(sheet, None, Some(&OrderBy::newest_first()))
    }

    /// Records whose refund is still outstanding
    pub fn fetch_pending(&self, sheet: &Sheet) -> Result<Vec<Record>> {
        self.select(sheet, Some(&Filter::pending()), None)
    }

    /// Count records in a sheet
    pub fn count(&self, sheet: &Sheet) -> Result<usize> {
        self.vet(sheet)?;
        let stmt = query::count(sheet);
        let count: i64 = self.conn()?.query_row(&stmt.sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper to convert a row (`id` then the declared columns) to a Record
fn row_to_record(row: &rusqlite::Row, columns: &[&'static str]) -> rusqlite::Result<Record> {
    let mut values = ColumnValues::new();
    for (i, column) in columns.iter().enumerate() {
        let value: Option<String> = row.get(i + 1)?;
        values.set(*column, value.unwrap_or_default());
    }
    Ok(Record { id: row.get(0)?, values })
}
