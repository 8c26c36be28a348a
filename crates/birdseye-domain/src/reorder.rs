//! Drag-and-drop reorder reconciliation.
//!
//! A drag runs inside one swimlane. The reconciler works on the lists the
//! user actually sees (the derived cells), produces the optimistic snapshot
//! and the rows that persist the new order.

use birdseye_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::row::Row;
use crate::{BoardState, ColumnId, Item, ItemId, SwimlaneId};

/// A position inside a column's visible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    pub column_id: ColumnId,
    pub index: usize,
}

/// Outcome of a drag gesture. `destination` is `None` when the card was
/// dropped outside every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragResult {
    pub item_id: ItemId,
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

/// Result of reconciling a drag.
#[derive(Debug, Clone)]
pub struct Reorder {
    /// Snapshot with the card already in place.
    pub state: BoardState,
    /// Column whose list was reindexed.
    pub column_id: ColumnId,
    /// `{id, column_id, sort_order}` for every card of the destination list,
    /// ready for one batch upsert.
    pub rows: Vec<Row>,
}

impl BoardState {
    /// Applies a drag inside `swimlane_id`.
    ///
    /// Returns `Ok(None)` for a drop outside any column. Only the destination
    /// list is reindexed to `0..n`; the source list just loses the card.
    pub fn apply_drag(
        &self,
        swimlane_id: SwimlaneId,
        drag: &DragResult,
    ) -> BoardResult<Option<Reorder>> {
        let Some(destination) = drag.destination else {
            return Ok(None);
        };

        let lane = self
            .view()
            .swimlane(swimlane_id)
            .ok_or_else(|| BoardError::NotFound(format!("swimlane {}", swimlane_id)))?;
        let cell = |column_id: ColumnId| {
            lane.column(column_id)
                .map(|column| column.items.clone())
                .ok_or_else(|| BoardError::NotFound(format!("column {}", column_id)))
        };

        let mut source_list = cell(drag.source.column_id)?;
        if drag.source.index >= source_list.len() {
            return Err(BoardError::NotFound(format!(
                "no card at index {} of column {}",
                drag.source.index, drag.source.column_id
            )));
        }
        let mut moved = source_list.remove(drag.source.index);
        if moved.id != drag.item_id {
            return Err(BoardError::Validation(format!(
                "card {} is not at index {} (found {})",
                drag.item_id, drag.source.index, moved.id
            )));
        }

        let mut destination_list = if destination.column_id == drag.source.column_id {
            source_list
        } else {
            cell(destination.column_id)?
        };

        moved.column_id = destination.column_id;
        let index = destination.index.min(destination_list.len());
        destination_list.insert(index, moved);
        reindex(&mut destination_list);

        let updated: HashMap<ItemId, &Item> =
            destination_list.iter().map(|item| (item.id, item)).collect();
        let items = self
            .items()
            .iter()
            .map(|item| match updated.get(&item.id) {
                Some(&changed) => changed.clone(),
                None => item.clone(),
            })
            .collect();

        Ok(Some(Reorder {
            state: self.with_items(items),
            column_id: destination.column_id,
            rows: destination_list.iter().map(order_row).collect(),
        }))
    }
}

fn reindex(list: &mut [Item]) {
    for (position, item) in list.iter_mut().enumerate() {
        item.sort_order = position as i32;
    }
}

fn order_row(item: &Item) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), item.id.to_string().into());
    row.insert("column_id".into(), item.column_id.to_string().into());
    row.insert("sort_order".into(), item.sort_order.into());
    row
}
