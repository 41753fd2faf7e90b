//! Pending returns - records whose refund has not been made yet

use crate::record::{ColumnValues, Record};
use crate::sheet::Sheet;
use crate::storage::RecordStore;
use crate::Result;
use super::{save_edit, ValidationPolicy};

pub struct PendingReturns<'a> {
    sheet: &'a Sheet,
    policy: &'a ValidationPolicy,
}

impl<'a> PendingReturns<'a> {
    pub fn new(sheet: &'a Sheet, policy: &'a ValidationPolicy) -> Self {
        Self { sheet, policy }
    }

    pub fn load(&self, store: &mut RecordStore<'_>) -> Result<Vec<Record>> {
        store.ensure_connected()?;
        store.fetch_pending(self.sheet)
    }

    /// Save an edit, subject to this view's validation policy
    pub fn save(&self, store: &mut RecordStore<'_>, id: i64, changes: &ColumnValues) -> Result<usize> {
        save_edit(store, self.sheet, self.policy, id, changes)
    }
}
