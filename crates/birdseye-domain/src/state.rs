//! Immutable board snapshots.
//!
//! A `BoardState` owns the base collections plus the active filter and
//! carries the derived view computed from them. Named actions never mutate a
//! snapshot; they return a new one.

use birdseye_core::BoardResult;

use crate::row::{merge_rows, Row, Table};
use crate::view::{column_totals, BoardView, ColumnTotal};
use crate::{Column, ColumnId, Item, ItemId, ItemUpdate, Swimlane, SwimlaneId, TextFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    swimlanes: Vec<Swimlane>,
    columns: Vec<Column>,
    items: Vec<Item>,
    filter: String,
    view: BoardView,
}

impl BoardState {
    pub fn new(swimlanes: Vec<Swimlane>, columns: Vec<Column>, items: Vec<Item>) -> Self {
        Self::build(swimlanes, columns, items, String::new())
    }

    fn build(
        swimlanes: Vec<Swimlane>,
        columns: Vec<Column>,
        items: Vec<Item>,
        filter: String,
    ) -> Self {
        let view = BoardView::compute(&swimlanes, &columns, &items, &TextFilter::new(&filter));
        Self {
            swimlanes,
            columns,
            items,
            filter,
            view,
        }
    }

    pub fn swimlanes(&self) -> &[Swimlane] {
        &self.swimlanes
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn swimlane(&self, id: SwimlaneId) -> Option<&Swimlane> {
        self.swimlanes.iter().find(|lane| lane.id == id)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn active_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.is_active)
    }

    pub fn column_totals(&self) -> Vec<ColumnTotal> {
        column_totals(&self.columns, &self.items)
    }

    pub fn with_filter(&self, filter: impl Into<String>) -> Self {
        Self::build(
            self.swimlanes.clone(),
            self.columns.clone(),
            self.items.clone(),
            filter.into(),
        )
    }

    pub fn with_swimlanes(&self, swimlanes: Vec<Swimlane>) -> Self {
        Self::build(
            swimlanes,
            self.columns.clone(),
            self.items.clone(),
            self.filter.clone(),
        )
    }

    pub fn with_columns(&self, columns: Vec<Column>) -> Self {
        Self::build(
            self.swimlanes.clone(),
            columns,
            self.items.clone(),
            self.filter.clone(),
        )
    }

    pub fn with_items(&self, items: Vec<Item>) -> Self {
        Self::build(
            self.swimlanes.clone(),
            self.columns.clone(),
            items,
            self.filter.clone(),
        )
    }

    /// Folds rows returned by the backend into the matching base collection.
    pub fn merge_rows(&self, table: Table, rows: Vec<Row>) -> BoardResult<Self> {
        Ok(match table {
            Table::Swimlanes => self.with_swimlanes(merge_rows(&self.swimlanes, rows)?),
            Table::Columns => self.with_columns(merge_rows(&self.columns, rows)?),
            Table::Items => self.with_items(merge_rows(&self.items, rows)?),
        })
    }

    /// True while any shown card still belongs to the lane. Such lanes
    /// cannot be deleted.
    pub fn swimlane_has_items(&self, id: SwimlaneId) -> bool {
        self.items
            .iter()
            .any(|item| item.swimlane_id == id && item.is_visible())
    }

    /// The column whose cards count as completed: the last active column.
    pub fn completed_column(&self) -> Option<&Column> {
        self.active_columns().last()
    }

    /// Archive patches for every shown card in the completed column.
    pub fn archive_completed_rows(&self) -> Vec<Row> {
        let Some(done) = self.completed_column() else {
            return Vec::new();
        };
        self.items
            .iter()
            .filter(|item| item.column_id == done.id && item.is_visible())
            .map(|item| ItemUpdate::archive().to_row(item.id))
            .collect()
    }

    /// Sort order for a card appended to the bottom of a cell.
    pub fn next_sort_order(&self, swimlane_id: SwimlaneId, column_id: ColumnId) -> i32 {
        self.items
            .iter()
            .filter(|item| {
                item.swimlane_id == swimlane_id && item.column_id == column_id && item.is_visible()
            })
            .map(|item| item.sort_order + 1)
            .max()
            .unwrap_or(0)
    }
}
