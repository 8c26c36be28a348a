//! Untyped rows as exchanged with the remote store, and the typed bridge.

use birdseye_core::{BoardError, BoardResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// One remote row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

pub(crate) fn default_true() -> bool {
    true
}

/// Remote tables owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Swimlanes,
    Columns,
    Items,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Swimlanes, Table::Columns, Table::Items];

    pub fn name(self) -> &'static str {
        match self {
            Table::Swimlanes => "swimlanes",
            Table::Columns => "columns",
            Table::Items => "items",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed entity stored as rows of one remote table.
pub trait TableRow: Serialize + DeserializeOwned + Clone {
    const TABLE: Table;

    fn id(&self) -> Uuid;

    fn to_row(&self) -> BoardResult<Row> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(row) => Ok(row),
            other => Err(BoardError::Serialization(format!(
                "{} row serialised to non-object {}",
                Self::TABLE,
                other
            ))),
        }
    }

    fn from_row(row: Row) -> BoardResult<Self> {
        serde_json::from_value(serde_json::Value::Object(row)).map_err(|e| {
            BoardError::Serialization(format!("invalid {} row: {}", Self::TABLE, e))
        })
    }
}

/// Extracts the `id` column of a row.
pub fn row_id(row: &Row) -> BoardResult<Uuid> {
    row.get("id")
        .and_then(|value| value.as_str())
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| BoardError::Serialization("row has no valid id".to_string()))
}

/// Merges rows returned by the backend into a base collection.
///
/// Rows whose id is already known patch that entity field by field; rows
/// with unseen ids are appended and must carry a complete entity. Existing
/// order is preserved. Any malformed row fails the whole merge so callers can
/// keep their previous collection.
pub fn merge_rows<T: TableRow>(existing: &[T], rows: Vec<Row>) -> BoardResult<Vec<T>> {
    let mut merged = existing.to_vec();
    let mut index: HashMap<Uuid, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, entity)| (entity.id(), i))
        .collect();

    for row in rows {
        let id = row_id(&row)?;
        match index.get(&id) {
            Some(&i) => {
                let mut patched = merged[i].to_row()?;
                patched.extend(row);
                merged[i] = T::from_row(patched)?;
            }
            None => {
                index.insert(id, merged.len());
                merged.push(T::from_row(row)?);
            }
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, Item, Swimlane};
    use serde_json::json;

    fn as_row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_known_id_is_patched_in_place() {
        let lanes = vec![Swimlane::new("A"), Swimlane::new("B")];
        let patch = as_row(json!({ "id": lanes[1].id, "is_open": false }));

        let merged = merge_rows(&lanes, vec![patch]).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].name, "B");
        assert!(!merged[1].is_open);
        assert_eq!(merged[0], lanes[0]);
    }

    #[test]
    fn test_unseen_id_is_appended() {
        let columns = vec![Column::new("Todo")];
        let fresh = Column::new("Done");

        let merged = merge_rows(&columns, vec![fresh.to_row().unwrap()]).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], fresh);
    }

    #[test]
    fn test_partial_unseen_row_fails() {
        let items: Vec<Item> = Vec::new();
        let partial = as_row(json!({ "id": Uuid::new_v4(), "sort_order": 2 }));
        let err = merge_rows(&items, vec![partial]).unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[test]
    fn test_row_without_id_fails() {
        let lanes = vec![Swimlane::new("A")];
        let err = merge_rows(&lanes, vec![as_row(json!({ "name": "x" }))]).unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[test]
    fn test_duplicate_new_rows_collapse() {
        let lanes: Vec<Swimlane> = Vec::new();
        let lane = Swimlane::new("Twice");
        let mut renamed = lane.to_row().unwrap();
        renamed.insert("name".into(), "Renamed".into());

        let merged = merge_rows(&lanes, vec![lane.to_row().unwrap(), renamed]).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Renamed");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Items.to_string(), "items");
        assert_eq!(Table::ALL.len(), 3);
    }
}
