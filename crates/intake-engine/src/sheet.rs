//! Spreadsheet row adapter
//!
//! Records keep lists structured; flattening to cell text happens only here.

use crate::record::MemberRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default list separator for cells
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Timestamp column
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
/// Entry id column
pub const ENTRY_ID_COLUMN: &str = "EntryID";
/// Member position column (0 = household head)
pub const MEMBER_INDEX_COLUMN: &str = "MemberIndex";

/// Ordered column to cell map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetRow {
    cells: IndexMap<String, String>,
}

impl SheetRow {
    /// Empty row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell; an existing column keeps its position
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Builder form of [`push`](Self::push)
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    /// Row for one member record
    #[must_use]
    pub fn from_member(record: &MemberRecord, index: usize, separator: &str) -> Self {
        let mut row = Self::new()
            .with(TIMESTAMP_COLUMN, timestamp_cell(&record.submitted_at))
            .with(ENTRY_ID_COLUMN, record.entry_id.to_string())
            .with(MEMBER_INDEX_COLUMN, index.to_string());
        for (id, value) in &record.values {
            row.push(id.as_str(), value.flatten(separator));
        }
        row
    }

    /// Cell text for a column
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Cells in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// ISO-8601 cell text for a timestamp
#[must_use]
pub fn timestamp_cell(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EntryId, RecordValue};
    use chrono::TimeZone;
    use intake_schema::FieldId;

    fn record() -> MemberRecord {
        let mut values = IndexMap::new();
        values.insert(FieldId::new("name"), RecordValue::Text("سارة".into()));
        values.insert(
            FieldId::new("chronicDiseases"),
            RecordValue::List(vec!["Diabetes".into(), "Heart".into()]),
        );
        MemberRecord {
            entry_id: EntryId::new_v4(),
            submitted_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            values,
        }
    }

    #[test]
    fn meta_columns_come_first() {
        let row = SheetRow::from_member(&record(), 2, DEFAULT_SEPARATOR);
        let columns: Vec<_> = row.columns().collect();
        assert_eq!(
            columns,
            vec!["Timestamp", "EntryID", "MemberIndex", "name", "chronicDiseases"]
        );
        assert_eq!(row.get("MemberIndex"), Some("2"));
        assert_eq!(row.get("Timestamp"), Some("2024-03-01T10:00:00.000Z"));
    }

    #[test]
    fn meta_columns_cannot_be_field_ids() {
        for column in [TIMESTAMP_COLUMN, ENTRY_ID_COLUMN, MEMBER_INDEX_COLUMN] {
            assert!(intake_schema::RESERVED_FIELD_IDS.contains(&column), "{column} not reserved");
        }
    }

    #[test]
    fn lists_flatten_with_separator() {
        assert_eq!(
            SheetRow::from_member(&record(), 0, DEFAULT_SEPARATOR).get("chronicDiseases"),
            Some("Diabetes, Heart")
        );
        assert_eq!(
            SheetRow::from_member(&record(), 0, " | ").get("chronicDiseases"),
            Some("Diabetes | Heart")
        );
    }
}
