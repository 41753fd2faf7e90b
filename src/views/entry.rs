//! Entry form - records a new incoming transfer

use tracing::info;
use crate::record::{ColumnValues, Status};
use crate::sheet::{self, Sheet};
use crate::storage::RecordStore;
use crate::{Error, Result};

/// Operator input for one new record on one sheet.
#[derive(Debug, Clone)]
pub struct EntryForm<'a> {
    sheet: &'a Sheet,
    fields: ColumnValues,
}

impl<'a> EntryForm<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Self {
            sheet,
            fields: ColumnValues::new(),
        }
    }

    pub fn with_fields(sheet: &'a Sheet, fields: ColumnValues) -> Self {
        Self { sheet, fields }
    }

    /// Token label shown read-only on the form
    pub fn token(&self) -> &str {
        &self.sheet.token
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.set(column, value);
    }

    /// Build the full record to insert.
    ///
    /// Blank required fields are reported together, by label. Managed
    /// columns are overwritten: token from the sheet, return hash and flag
    /// blank, status "return not done". Input naming columns the sheet does
    /// not carry is passed through and rejected by the query builder.
    pub fn validate(&self) -> Result<ColumnValues> {
        let input = self.fields.trimmed();

        let missing: Vec<String> = self
            .sheet
            .schema
            .columns()
            .filter(|c| c.required && !c.managed)
            .filter(|c| input.get(c.name).is_none_or(str::is_empty))
            .map(|c| c.label.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        let mut values = input;
        values.set(sheet::TOKEN, self.sheet.token.as_str());
        values.set(sheet::RETURN_HASH, "");
        values.set(sheet::RETURN_DONE, "");
        values.set(sheet::STATUS, Status::NotDone.as_str());
        for column in self.sheet.schema.columns() {
            if !values.contains(column.name) {
                values.set(column.name, "");
            }
        }
        Ok(values)
    }

    /// Validate, connect if needed, and insert. Returns the new record id.
    pub fn submit(&self, store: &mut RecordStore<'_>) -> Result<i64> {
        let values = self.validate()?;
        store.ensure_connected()?;
        let id = store.insert(self.sheet, &values)?;
        info!("Entry form saved record {} on sheet {}", id, self.sheet.name);
        Ok(id)
    }
}
