//! Views - interaction logic behind the three operator screens
//!
//! - [`EntryForm`]: enter a new incoming transfer
//! - [`PendingReturns`]: records whose refund is outstanding
//! - [`SearchGrid`]: every record, searchable, editable and deletable
//!
//! Each action resolves its sheet through the registry, connects on demand
//! and performs at most one write. Failures come back as [`crate::Error`];
//! rendering them is the front end's job.

pub mod entry;
pub mod pending;
pub mod search;

pub use entry::EntryForm;
pub use pending::PendingReturns;
pub use search::SearchGrid;

use serde::{Deserialize, Serialize};
use crate::record::ColumnValues;
use crate::sheet::Sheet;
use crate::storage::RecordStore;
use crate::{Error, Result};

/// Columns that must be non-blank for a view to save an edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default)]
    pub required: Vec<String>,
}

impl ValidationPolicy {
    pub fn require<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Labels of required columns left blank in `values`. Columns the
    /// sheet does not carry are not checked.
    pub fn missing(&self, sheet: &Sheet, values: &ColumnValues) -> Vec<String> {
        self.required
            .iter()
            .filter_map(|name| sheet.schema.column(name))
            .filter(|c| values.get(c.name).is_none_or(|v| v.trim().is_empty()))
            .map(|c| c.label.to_string())
            .collect()
    }

    pub fn check(&self, sheet: &Sheet, values: &ColumnValues) -> Result<()> {
        let missing = self.missing(sheet, values);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingFields(missing))
        }
    }
}

/// Save an edit made in a list view.
///
/// The policy is checked against the record as it would read after the
/// edit, so columns already filled in need not be re-entered.
fn save_edit(
    store: &mut RecordStore<'_>,
    sheet: &Sheet,
    policy: &ValidationPolicy,
    id: i64,
    changes: &ColumnValues,
) -> Result<usize> {
    let changes = changes.trimmed();
    if changes.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    store.ensure_connected()?;
    let mut merged = store
        .fetch(sheet, id)?
        .map(|r| r.values)
        .unwrap_or_default();
    for (column, value) in changes.iter() {
        merged.set(column, value);
    }
    policy.check(sheet, &merged)?;

    store.update(sheet, id, &changes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sheet::{SchemaRegistry, RETURN_DONE, RETURN_HASH};

    /// Operator input for a complete entry form
    pub(crate) fn form_input(sheet: &Sheet) -> ColumnValues {
        let mut values = ColumnValues::new();
        for column in sheet.schema.columns().filter(|c| !c.managed) {
            values.set(column.name, format!(" {} input ", column.name));
        }
        values
    }

    #[test]
    fn test_policy_reports_labels() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("TON").unwrap();
        let policy = ValidationPolicy::require([RETURN_HASH, RETURN_DONE, "memo"]);

        let values = ColumnValues::new().with(RETURN_HASH, "  ").with("memo", "m");
        assert_eq!(policy.missing(sheet, &values), vec!["Return hash", "Return done (+)"]);

        // memo is skipped on sheets without it
        let btc = registry.lookup("BTC - Bitcoin").unwrap();
        let values = ColumnValues::new().with(RETURN_HASH, "h").with(RETURN_DONE, "+");
        assert!(policy.check(btc, &values).is_ok());
    }
}
