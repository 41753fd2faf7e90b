//! Query Builder - parameterized SQL for sheet tables
//!
//! Identifiers (table and column names) are taken from the [`Sheet`] the
//! caller resolved through the registry and are always emitted quoted.
//! Values are always bound as positional parameters (`?1`, `?2`, ...) and
//! never appear in the SQL text.

use crate::record::{ColumnValues, Status};
use crate::sheet::{self, Sheet};
use crate::{Error, Result};
use rusqlite::types::Value;

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Equality filter for [`select`]
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn id(id: i64) -> Self {
        Self::eq(sheet::ID, id)
    }

    /// Records whose refund has not been made yet
    pub fn pending() -> Self {
        Self::eq(sheet::STATUS, Status::NotDone.as_str().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    /// Most recently entered first
    pub fn newest_first() -> Self {
        Self {
            column: sheet::ID.to_string(),
            direction: Direction::Desc,
        }
    }
}

/// Quote an identifier for SQL, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Columns a filter or ordering may name: `id` plus the sheet's columns
fn check_selectable(sheet: &Sheet, column: &str) -> Result<()> {
    if column == sheet::ID || sheet.schema.has_column(column) {
        Ok(())
    } else {
        Err(unknown_column(sheet, column))
    }
}

fn unknown_column(sheet: &Sheet, column: &str) -> Error {
    Error::UnknownColumn {
        table: sheet.table.clone(),
        column: column.to_string(),
    }
}

/// `INSERT` of one full record.
///
/// The key set of `values` must equal the sheet's declared columns exactly;
/// columns are emitted in declared order whatever order the caller used.
pub fn insert(sheet: &Sheet, values: &ColumnValues) -> Result<Statement> {
    let declared = sheet.schema.column_names();

    let missing: Vec<String> = declared
        .iter()
        .filter(|c| !values.contains(c))
        .map(|c| c.to_string())
        .collect();
    let unexpected: Vec<String> = values
        .columns()
        .filter(|c| !declared.iter().any(|d| d == c))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(Error::ColumnMismatch {
            table: sheet.table.clone(),
            missing,
            unexpected,
        });
    }

    let columns: Vec<String> = declared.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=declared.len()).map(|i| format!("?{}", i)).collect();
    let params = declared
        .iter()
        .map(|c| Value::Text(values.get(c).unwrap_or_default().to_string()))
        .collect();

    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&sheet.table),
            columns.join(", "),
            placeholders.join(", ")
        ),
        params,
    })
}

/// `UPDATE` of the given columns of one record.
pub fn update(sheet: &Sheet, id: i64, values: &ColumnValues) -> Result<Statement> {
    if values.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    let mut assignments = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len() + 1);
    for (i, (column, value)) in values.iter().enumerate() {
        if !sheet.schema.has_column(column) {
            return Err(unknown_column(sheet, column));
        }
        assignments.push(format!("{} = ?{}", quote_ident(column), i + 1));
        params.push(Value::Text(value.to_string()));
    }
    params.push(Value::Integer(id));

    Ok(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote_ident(&sheet.table),
            assignments.join(", "),
            quote_ident(sheet::ID),
            params.len()
        ),
        params,
    })
}

/// `DELETE` of one record.
pub fn delete(sheet: &Sheet, id: i64) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?1",
            quote_ident(&sheet.table),
            quote_ident(sheet::ID)
        ),
        params: vec![Value::Integer(id)],
    }
}

/// `SELECT id, <declared columns>` with optional equality filter and ordering.
pub fn select(sheet: &Sheet, filter: Option<&Filter>, order: Option<&OrderBy>) -> Result<Statement> {
    let columns: Vec<String> = std::iter::once(sheet::ID)
        .chain(sheet.schema.columns().map(|c| c.name))
        .map(quote_ident)
        .collect();

    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), quote_ident(&sheet.table));
    let mut params = Vec::new();

    if let Some(filter) = filter {
        check_selectable(sheet, &filter.column)?;
        sql.push_str(&format!(" WHERE {} = ?1", quote_ident(&filter.column)));
        params.push(filter.value.clone());
    }

    if let Some(order) = order {
        check_selectable(sheet, &order.column)?;
        sql.push_str(&format!(
            " ORDER BY {} {}",
            quote_ident(&order.column),
            order.direction.as_str()
        ));
    }

    Ok(Statement { sql, params })
}

/// `SELECT COUNT(*)` over a sheet table
pub fn count(sheet: &Sheet) -> Statement {
    Statement {
        sql: format!("SELECT COUNT(*) FROM {}", quote_ident(&sheet.table)),
        params: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SchemaRegistry;

    fn full_values(sheet: &Sheet) -> ColumnValues {
        sheet
            .schema
            .columns()
            .map(|c| (c.name, format!("v-{}", c.name)))
            .collect()
    }

    #[test]
    fn test_insert_uses_declared_order() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("BTC - Bitcoin").unwrap();

        // Reverse the caller's order; output must still follow the schema
        let mut pairs: Vec<_> = full_values(sheet).iter().map(|(c, v)| (c.to_string(), v.to_string())).collect();
        pairs.reverse();
        let values: ColumnValues = pairs.into_iter().collect();

        let stmt = insert(sheet, &values).unwrap();
        assert!(stmt.sql.starts_with("INSERT INTO \"support_data_btc_-_bitcoin\" (\"fio\", \"number\""));
        assert!(stmt.sql.ends_with("?14)"));
        assert_eq!(stmt.params.len(), 14);
        assert_eq!(stmt.params[0], Value::Text("v-fio".into()));
        assert_eq!(stmt.params[13], Value::Text("v-status".into()));
    }

    #[test]
    fn test_insert_rejects_memo_on_plain_sheet() {
        let registry = SchemaRegistry::builtin();
        let ton = registry.lookup("TON").unwrap();
        let btc = registry.lookup("BTC - Bitcoin").unwrap();

        let payload = full_values(ton);
        assert!(insert(ton, &payload).is_ok());

        match insert(btc, &payload) {
            Err(Error::ColumnMismatch { missing, unexpected, .. }) => {
                assert!(missing.is_empty());
                assert_eq!(unexpected, vec!["memo".to_string()]);
            }
            other => panic!("expected column mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_rejects_missing_column() {
        let registry = SchemaRegistry::builtin();
        let ton = registry.lookup("TON").unwrap();
        let mut values = full_values(ton);
        values.remove("memo");
        let err = insert(ton, &values).unwrap_err();
        assert!(matches!(err, Error::ColumnMismatch { ref missing, .. } if missing == &vec!["memo".to_string()]));
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_update() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("TON").unwrap();
        let values = ColumnValues::new()
            .with("return_hash", "0xdead")
            .with("memo", "m");

        let stmt = update(sheet, 7, &values).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"support_data_ton\" SET \"return_hash\" = ?1, \"memo\" = ?2 WHERE \"id\" = ?3"
        );
        assert_eq!(stmt.params.last(), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_update_rejects_empty_and_unknown() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("ETH - Ethereum").unwrap();
        assert!(matches!(update(sheet, 1, &ColumnValues::new()), Err(Error::EmptyUpdate)));

        let values = ColumnValues::new().with("memo", "x");
        assert!(matches!(update(sheet, 1, &values), Err(Error::UnknownColumn { .. })));

        let values = ColumnValues::new().with("id", "5");
        assert!(matches!(update(sheet, 1, &values), Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_values_are_never_inlined() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("TON").unwrap();
        let evil = "x'; DROP TABLE support_data_ton; --";
        let values = ColumnValues::new().with("fio", evil);

        let stmt = update(sheet, 1, &values).unwrap();
        assert!(!stmt.sql.contains(evil));
        assert_eq!(stmt.params[0], Value::Text(evil.into()));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("support_data_usdt_(ton)"), "\"support_data_usdt_(ton)\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_select() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("USDT (TON)").unwrap();

        let all = select(sheet, None, Some(&OrderBy::newest_first())).unwrap();
        assert!(all.sql.starts_with("SELECT \"id\", \"fio\""));
        assert!(all.sql.contains("\"memo\" FROM \"support_data_usdt_(ton)\""));
        assert!(all.sql.ends_with("ORDER BY \"id\" DESC"));
        assert!(all.params.is_empty());

        let pending = select(sheet, Some(&Filter::pending()), None).unwrap();
        assert!(pending.sql.ends_with("WHERE \"status\" = ?1"));
        assert_eq!(pending.params, vec![Value::Text("return not done".into())]);

        let bad = Filter::eq("password", "x".to_string());
        assert!(matches!(select(sheet, Some(&bad), None), Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_delete() {
        let registry = SchemaRegistry::builtin();
        let sheet = registry.lookup("TRX - Tron").unwrap();
        let stmt = delete(sheet, 3);
        assert_eq!(stmt.sql, "DELETE FROM \"support_data_trx_-_tron\" WHERE \"id\" = ?1");
        assert_eq!(stmt.params, vec![Value::Integer(3)]);
    }
}
