//! Database schema definitions

use crate::query::quote_ident;
use crate::sheet::{self, SchemaRegistry, Sheet};

/// `CREATE TABLE` for one sheet; every business column is text
pub fn create_sheet_table(sheet: &Sheet) -> String {
    let mut columns = vec![format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        quote_ident(sheet::ID)
    )];
    columns.extend(
        sheet
            .schema
            .columns()
            .map(|c| format!("{} TEXT NOT NULL DEFAULT ''", quote_ident(c.name))),
    );

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quote_ident(&sheet.table),
        columns.join(",\n    ")
    )
}

/// `CREATE INDEX` on the status column, which the pending list filters by
pub fn create_status_index(sheet: &Sheet) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {}({})",
        quote_ident(&format!("idx_{}_status", sheet.table)),
        quote_ident(&sheet.table),
        quote_ident(sheet::STATUS)
    )
}

/// All schema creation statements
pub fn all_schema_statements(registry: &SchemaRegistry) -> Vec<String> {
    let mut stmts: Vec<String> = registry.sheets().map(create_sheet_table).collect();
    stmts.extend(registry.sheets().map(create_status_index));
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ddl_follows_schema() {
        let registry = SchemaRegistry::builtin();
        let ton = registry.lookup("USDT (TON)").unwrap();
        let ddl = create_sheet_table(ton);

        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"support_data_usdt_(ton)\""));
        assert!(ddl.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(ddl.contains("\"memo\" TEXT NOT NULL DEFAULT ''"));

        let btc = registry.lookup("BTC - Bitcoin").unwrap();
        assert!(!create_sheet_table(btc).contains("memo"));
    }

    #[test]
    fn test_one_table_and_index_per_sheet() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(all_schema_statements(&registry).len(), registry.len() * 2);
    }
}
