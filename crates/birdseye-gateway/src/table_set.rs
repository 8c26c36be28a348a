use birdseye_core::{BoardError, BoardResult};
use birdseye_domain::row::row_id;
use birdseye_domain::{Column, Row, Table, TableRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::filter::RowFilter;

/// The three remote tables held locally, with the same insert and upsert
/// rules the REST backend applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSet {
    #[serde(default)]
    pub swimlanes: Vec<Row>,
    #[serde(default)]
    pub columns: Vec<Row>,
    #[serde(default)]
    pub items: Vec<Row>,
}

impl TableSet {
    /// An empty board with one active column per name.
    pub fn with_columns(names: &[String]) -> BoardResult<Self> {
        let columns = names
            .iter()
            .map(|name| Column::new(name.as_str()).to_row())
            .collect::<BoardResult<Vec<_>>>()?;
        Ok(Self {
            columns,
            ..Self::default()
        })
    }

    pub fn rows(&self, table: Table) -> &[Row] {
        match table {
            Table::Swimlanes => &self.swimlanes,
            Table::Columns => &self.columns,
            Table::Items => &self.items,
        }
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Row> {
        match table {
            Table::Swimlanes => &mut self.swimlanes,
            Table::Columns => &mut self.columns,
            Table::Items => &mut self.items,
        }
    }

    pub fn fetch(&self, table: Table, filter: &RowFilter) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .rows(table)
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        filter.sort(&mut rows);
        rows
    }

    pub fn insert(&mut self, table: Table, mut row: Row) -> BoardResult<Row> {
        let id = match row.get("id") {
            None | Some(Value::Null) => {
                let id = Uuid::new_v4();
                row.insert("id".to_string(), Value::String(id.to_string()));
                id
            }
            Some(_) => row_id(&row)
                .map_err(|_| BoardError::Validation(format!("invalid id in {} row", table)))?,
        };
        if self.position(table, id).is_some() {
            return Err(BoardError::Validation(format!(
                "duplicate key {} in {}",
                id, table
            )));
        }
        self.rows_mut(table).push(row.clone());
        Ok(row)
    }

    pub fn upsert(&mut self, table: Table, rows: Vec<Row>) -> BoardResult<Vec<Row>> {
        let ids = rows
            .iter()
            .map(|row| {
                row_id(row).map_err(|_| {
                    BoardError::Validation(format!("upsert into {} needs a valid id", table))
                })
            })
            .collect::<BoardResult<Vec<_>>>()?;

        let mut stored = Vec::with_capacity(rows.len());
        for (id, row) in ids.into_iter().zip(rows) {
            match self.position(table, id) {
                Some(i) => {
                    let existing = &mut self.rows_mut(table)[i];
                    existing.extend(row);
                    stored.push(existing.clone());
                }
                None => {
                    self.rows_mut(table).push(row.clone());
                    stored.push(row);
                }
            }
        }
        Ok(stored)
    }

    fn position(&self, table: Table, id: Uuid) -> Option<usize> {
        self.rows(table)
            .iter()
            .position(|row| row_id(row).is_ok_and(|existing| existing == id))
    }
}
