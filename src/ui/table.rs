use crate::record::Record;
use crate::sheet::Sheet;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct SheetRow {
    #[tabled(rename = "Sheet")]
    pub name: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Token")]
    pub token: String,
    #[tabled(rename = "Memo")]
    pub memo: String,
    #[tabled(rename = "Records")]
    pub records: String,
}

pub fn sheets_table(rows: &[SheetRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Records laid out under the sheet's column labels, id first
pub fn records_table(sheet: &Sheet, records: &[&Record]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(
        std::iter::once("№".to_string()).chain(sheet.schema.columns().map(|c| c.label.to_string())),
    );
    for record in records {
        builder.push_record(std::iter::once(record.id.to_string()).chain(record.row(sheet)));
    }

    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ColumnValues;
    use crate::sheet::SchemaRegistry;

    #[test]
    fn test_records_table_has_memo_header_on_ton() {
        let registry = SchemaRegistry::builtin();
        let ton = registry.lookup("TON").unwrap();
        let record = Record {
            id: 9,
            values: ColumnValues::new().with("fio", "Ann").with("memo", "m-123"),
        };

        let table = records_table(ton, &[&record]);
        assert!(table.contains("Memo"));
        assert!(table.contains("m-123"));
        assert!(table.contains("Ann"));

        assert!(records_table(ton, &[]).is_empty());
    }
}
