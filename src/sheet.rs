//! Schema Registry - sheet to table routing
//!
//! Every sheet (one per token) maps to:
//! - a physical table (`support_data_<sheet>`)
//! - the token label written into each record
//! - an ordered column list: the shared base columns plus, for TON-based
//!   sheets, the `memo` column
//!
//! The registry is built once at start-up and handed out by reference. Table
//! and column names used anywhere in SQL come from here and nowhere else.

use crate::{Error, Result};
use serde::Serialize;

/// A business column of a sheet table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    /// Human-readable label shown to operators
    pub label: &'static str,
    /// Must be non-blank when a record is entered
    pub required: bool,
    /// Filled by the entry form itself, never typed by the operator
    pub managed: bool,
}

impl ColumnDef {
    const fn input(name: &'static str, label: &'static str) -> Self {
        Self { name, label, required: true, managed: false }
    }

    const fn optional(name: &'static str, label: &'static str) -> Self {
        Self { name, label, required: false, managed: false }
    }

    const fn managed(name: &'static str, label: &'static str) -> Self {
        Self { name, label, required: false, managed: true }
    }
}

pub const FIO: &str = "fio";
pub const NUMBER: &str = "number";
pub const DATE: &str = "date";
pub const USER_ID: &str = "user_id";
pub const APPLICATION_AMOUNT: &str = "application_amount";
pub const TOKEN: &str = "token";
pub const RECEIPT_AMOUNT: &str = "receipt_amount";
pub const HASH: &str = "hash";
pub const SENDER_ADDRESS: &str = "sender_address";
pub const RETURN_ADDRESS: &str = "return_address";
pub const RETURN_HASH: &str = "return_hash";
pub const RETURN_DONE: &str = "return_done";
pub const RETURN_REASON: &str = "return_reason";
pub const STATUS: &str = "status";
pub const MEMO: &str = "memo";

/// Identity column present in every sheet table
pub const ID: &str = "id";

/// Columns shared by every sheet, in table order
pub const BASE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::input(FIO, "Full name"),
    ColumnDef::input(NUMBER, "Number"),
    ColumnDef::input(DATE, "Date"),
    ColumnDef::input(USER_ID, "Client ID"),
    ColumnDef::optional(APPLICATION_AMOUNT, "Requested amount"),
    // `token` is required, but the form fills it from the sheet
    ColumnDef { name: TOKEN, label: "Token", required: true, managed: true },
    ColumnDef::input(RECEIPT_AMOUNT, "Received amount"),
    ColumnDef::input(HASH, "Hash"),
    ColumnDef::input(SENDER_ADDRESS, "Sender address"),
    ColumnDef::input(RETURN_ADDRESS, "Return address"),
    ColumnDef::managed(RETURN_HASH, "Return hash"),
    ColumnDef::managed(RETURN_DONE, "Return done (+)"),
    ColumnDef::input(RETURN_REASON, "Return reason"),
    ColumnDef::managed(STATUS, "Status"),
];

/// Variant column carried by TON-based sheets only
pub const MEMO_COLUMN: ColumnDef = ColumnDef::optional(MEMO, "Memo");

/// Column set of one sheet table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSchema {
    pub base_columns: Vec<ColumnDef>,
    pub optional_column: Option<ColumnDef>,
}

impl SheetSchema {
    pub fn new(optional_column: Option<ColumnDef>) -> Self {
        Self {
            base_columns: BASE_COLUMNS.to_vec(),
            optional_column,
        }
    }

    /// All business columns in table order (base first, then the variant)
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.base_columns.iter().chain(self.optional_column.iter())
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().map(|c| c.name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn has_variant(&self) -> bool {
        self.optional_column.is_some()
    }

    pub fn len(&self) -> usize {
        self.base_columns.len() + usize::from(self.optional_column.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A logical sheet: one token, one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    /// Display name, e.g. "BTC - Bitcoin"
    pub name: String,
    /// Physical table name
    pub table: String,
    /// Token label written into each record
    pub token: String,
    pub schema: SheetSchema,
}

impl Sheet {
    pub fn new(name: &str, table: &str, token: &str, with_memo: bool) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            token: token.to_string(),
            schema: SheetSchema::new(with_memo.then_some(MEMO_COLUMN)),
        }
    }

    pub fn has_memo(&self) -> bool {
        self.schema.has_variant()
    }
}

/// Immutable sheet lookup table.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    sheets: Vec<Sheet>,
}

impl SchemaRegistry {
    /// The sheets the support desk works with
    pub fn builtin() -> Self {
        Self::from_sheets(vec![
            Sheet::new("BTC - Bitcoin", "support_data_btc_-_bitcoin", "BTC", false),
            Sheet::new("ETH - Ethereum", "support_data_eth_-_ethereum", "ETH", false),
            Sheet::new("USDT (ERC-20)", "support_data_usdt_(erc-20)", "USDT (ETH)", false),
            Sheet::new("TRX - Tron", "support_data_trx_-_tron", "TRX", false),
            Sheet::new("USDT (TRC-20)", "support_data_usdt_(trc-20)", "USDT (TRX)", false),
            Sheet::new("TON", "support_data_ton", "TON", true),
            Sheet::new("USDT (TON)", "support_data_usdt_(ton)", "USDT (TON)", true),
            Sheet::new("USDC (ERC-20)", "support_data_usdc_(erc-20)", "USDC (ETH)", false),
        ])
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Resolve a sheet by display name
    pub fn lookup(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))
    }

    /// Resolve a sheet by its physical table name
    pub fn by_table(&self, table: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.table == table)
            .ok_or_else(|| Error::UnknownTable(table.to_string()))
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// First sheet in declared order, selected when the operator picks none
    pub fn default_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_only_on_ton_sheets() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.len(), 8);

        for sheet in registry.sheets() {
            assert!(!sheet.table.is_empty());
            let expect_memo = sheet.name == "TON" || sheet.name == "USDT (TON)";
            assert_eq!(sheet.schema.has_column(MEMO), expect_memo, "sheet {}", sheet.name);
            assert_eq!(sheet.schema.len(), if expect_memo { 15 } else { 14 });
        }
    }

    #[test]
    fn test_lookup() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("USDT (TRC-20)").unwrap();
        assert_eq!(sheet.table, "support_data_usdt_(trc-20)");
        assert_eq!(sheet.token, "USDT (TRX)");

        let names = sheet.schema.column_names();
        assert_eq!(names.first(), Some(&FIO));
        assert_eq!(names.last(), Some(&STATUS));
    }

    #[test]
    fn test_unknown_sheet() {
        let registry = SchemaRegistry::builtin();
        let err = registry.lookup("DOGE").unwrap_err();
        assert!(matches!(err, Error::UnknownSheet(ref s) if s == "DOGE"));
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        // Lookup is by display name, not token label
        assert!(registry.lookup("BTC").is_err());
    }

    #[test]
    fn test_by_table() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.by_table("support_data_ton").unwrap().name, "TON");
        assert!(matches!(registry.by_table("users"), Err(Error::UnknownTable(_))));
    }

    #[test]
    fn test_memo_is_last_column() {
        let registry = SchemaRegistry::builtin();
        let ton = registry.lookup("TON").unwrap();
        assert_eq!(ton.schema.columns().last().map(|c| c.name), Some(MEMO));
        assert_eq!(registry.default_sheet().unwrap().name, "BTC - Bitcoin");
    }
}
