//! Record types - rows of a sheet table
//!
//! A record is an identity plus an ordered column/value mapping. Every
//! business column is text; the only closed value set is `status`.

use crate::sheet::{self, Sheet};
use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::str::FromStr;

/// Refund status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Funds not yet returned to the client
    NotDone,
    /// Funds returned
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotDone => "return not done",
            Status::Done => "return done",
        }
    }

    pub fn all() -> &'static [Status] {
        &[Status::NotDone, Status::Done]
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "return not done" => Ok(Status::NotDone),
            "return done" => Ok(Status::Done),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered column -> value mapping.
///
/// Setting an existing column replaces its value in place, so the order is
/// the order in which columns were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnValues(Vec<(String, String)>);

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        let idx = self.0.iter().position(|(c, _)| c == column)?;
        Some(self.0.remove(idx).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with every value trimmed of surrounding whitespace
    pub fn trimmed(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(c, v)| (c.clone(), v.trim().to_string()))
                .collect(),
        )
    }

    /// Parse a `column=value` assignment as typed on the command line
    pub fn parse_assignment(s: &str) -> Result<(String, String)> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("expected column=value, got '{}'", s)))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(Error::Config(format!("missing column name in '{}'", s)));
        }
        Ok((column.to_string(), value.to_string()))
    }

    /// Reject any `status` value outside the closed set
    pub fn check_status(&self) -> Result<()> {
        match self.get(sheet::STATUS) {
            Some(value) => value.parse::<Status>().map(|_| ()),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = ColumnValues::new();
        for (k, v) in iter {
            values.set(k, v);
        }
        values
    }
}

impl Serialize for ColumnValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (c, v) in &self.0 {
            map.serialize_entry(c, v)?;
        }
        map.end()
    }
}

/// One stored row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub values: ColumnValues,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column)
    }

    pub fn status(&self) -> Option<Status> {
        self.get(sheet::STATUS).and_then(|s| s.parse().ok())
    }

    /// Case-insensitive substring match against the id and every value
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystack = std::iter::once(self.id.to_string())
            .chain(self.values.iter().map(|(_, v)| v.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        haystack.contains(&needle)
    }

    /// Values laid out in the sheet's column order, blank where absent
    pub fn row(&self, sheet: &Sheet) -> Vec<String> {
        sheet
            .schema
            .columns()
            .map(|c| self.get(c.name).unwrap_or_default().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in Status::all() {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), *status);
        }
        assert!(matches!("done".parse::<Status>(), Err(Error::InvalidStatus(_))));
    }

    #[test]
    fn test_padded_status_is_not_in_closed_set() {
        assert!(matches!(" return not done ".parse::<Status>(), Err(Error::InvalidStatus(_))));
        assert!(matches!("Return Done".parse::<Status>(), Err(Error::InvalidStatus(_))));

        let padded = ColumnValues::new().with("status", "return done ");
        assert!(matches!(padded.check_status(), Err(Error::InvalidStatus(_))));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut values = ColumnValues::new().with("fio", "A").with("hash", "h1");
        values.set("fio", "B");
        assert_eq!(values.columns().collect::<Vec<_>>(), vec!["fio", "hash"]);
        assert_eq!(values.get("fio"), Some("B"));
        assert_eq!(values.remove("hash"), Some("h1".to_string()));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_parse_assignment() {
        let (c, v) = ColumnValues::parse_assignment("memo=a=b").unwrap();
        assert_eq!(c, "memo");
        assert_eq!(v, "a=b");
        assert!(ColumnValues::parse_assignment("memo").is_err());
        assert!(ColumnValues::parse_assignment("=x").is_err());
    }

    #[test]
    fn test_check_status() {
        let ok = ColumnValues::new().with("status", "return done");
        assert!(ok.check_status().is_ok());
        let bad = ColumnValues::new().with("status", "pending");
        assert!(matches!(bad.check_status(), Err(Error::InvalidStatus(_))));
    }

    #[test]
    fn test_record_matches() {
        let record = Record {
            id: 42,
            values: ColumnValues::new().with("fio", "Ivan Petrov").with("hash", "0xABC"),
        };
        assert!(record.matches("petrov"));
        assert!(record.matches("0xabc"));
        assert!(record.matches("42"));
        assert!(record.matches(""));
        assert!(!record.matches("sidorov"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = Record {
            id: 1,
            values: ColumnValues::new().with("fio", "A"),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "fio": "A"}));
    }
}
