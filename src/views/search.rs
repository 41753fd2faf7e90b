//! Search grid - every record of a sheet, newest first

use tracing::{info, warn};
use crate::record::{ColumnValues, Record};
use crate::sheet::Sheet;
use crate::storage::RecordStore;
use crate::Result;
use super::{save_edit, ValidationPolicy};

pub struct SearchGrid<'a> {
    sheet: &'a Sheet,
    policy: &'a ValidationPolicy,
    records: Vec<Record>,
}

impl<'a> SearchGrid<'a> {
    pub fn new(sheet: &'a Sheet, policy: &'a ValidationPolicy) -> Self {
        Self {
            sheet,
            policy,
            records: Vec::new(),
        }
    }

    /// Reload every record from the store
    pub fn load(&mut self, store: &mut RecordStore<'_>) -> Result<&[Record]> {
        store.ensure_connected()?;
        self.records = store.fetch_all(self.sheet)?;
        Ok(&self.records)
    }

    /// Records from the last load matching `text` anywhere in the row
    pub fn filter(&self, text: &str) -> Vec<&Record> {
        self.records.iter().filter(|r| r.matches(text)).collect()
    }

    pub fn save(&mut self, store: &mut RecordStore<'_>, id: i64, changes: &ColumnValues) -> Result<usize> {
        let changed = save_edit(store, self.sheet, self.policy, id, changes)?;
        self.refresh(store);
        Ok(changed)
    }

    /// Physically delete a record. Confirmation happens before this call.
    pub fn delete(&mut self, store: &mut RecordStore<'_>, id: i64) -> Result<usize> {
        store.ensure_connected()?;
        let changed = store.delete(self.sheet, id)?;
        if changed == 0 {
            info!("No record id={} in {} to delete", id, self.sheet.table);
        }
        self.refresh(store);
        Ok(changed)
    }

    /// Reload after a committed write; the write stands even if this fails
    fn refresh(&mut self, store: &mut RecordStore<'_>) {
        if let Err(e) = self.load(store) {
            warn!("Failed to reload {} after write: {}", self.sheet.table, e);
        }
    }
}
