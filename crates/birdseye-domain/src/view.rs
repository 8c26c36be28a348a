//! The derived board view: swimlanes × columns × items.

use serde::Serialize;
use std::cmp::Ordering;

use crate::{Column, ColumnId, Item, Swimlane, SwimlaneId, TextFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub swimlanes: Vec<SwimlaneView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwimlaneView {
    pub swimlane: Swimlane,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub column: Column,
    pub items: Vec<Item>,
}

/// Number of shown cards in a column across every swimlane, ignoring the
/// text filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnTotal {
    pub column_id: ColumnId,
    pub count: usize,
}

impl BoardView {
    /// Builds the nested view from the flat base collections.
    ///
    /// Inactive swimlanes and columns are left out, as are soft-deleted,
    /// archived and non-matching items. Swimlanes are ordered by name,
    /// columns keep collection order, and cells are ordered by `sort_order`.
    pub fn compute(
        swimlanes: &[Swimlane],
        columns: &[Column],
        items: &[Item],
        filter: &TextFilter,
    ) -> Self {
        let mut lanes: Vec<&Swimlane> = swimlanes.iter().filter(|s| s.is_active).collect();
        lanes.sort_by(|a, b| compare_swimlanes(a, b));

        let active_columns: Vec<&Column> = columns.iter().filter(|c| c.is_active).collect();
        let shown: Vec<&Item> = items
            .iter()
            .filter(|item| item.is_visible() && filter.matches(item))
            .collect();

        let swimlanes = lanes
            .into_iter()
            .map(|swimlane| SwimlaneView {
                swimlane: swimlane.clone(),
                columns: active_columns
                    .iter()
                    .map(|column| {
                        let mut cell: Vec<Item> = shown
                            .iter()
                            .filter(|item| {
                                item.swimlane_id == swimlane.id && item.column_id == column.id
                            })
                            .map(|item| (*item).clone())
                            .collect();
                        cell.sort_by_key(|item| item.sort_order);
                        ColumnView {
                            column: (*column).clone(),
                            items: cell,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { swimlanes }
    }

    pub fn swimlane(&self, id: SwimlaneId) -> Option<&SwimlaneView> {
        self.swimlanes.iter().find(|lane| lane.swimlane.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.swimlanes
            .iter()
            .all(|lane| lane.columns.iter().all(|column| column.items.is_empty()))
    }

    pub fn item_count(&self) -> usize {
        self.swimlanes.iter().map(SwimlaneView::item_count).sum()
    }
}

impl SwimlaneView {
    pub fn column(&self, id: ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|column| column.column.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.columns.iter().map(|column| column.items.len()).sum()
    }
}

/// Per-column totals for the header badges.
pub fn column_totals(columns: &[Column], items: &[Item]) -> Vec<ColumnTotal> {
    columns
        .iter()
        .filter(|column| column.is_active)
        .map(|column| ColumnTotal {
            column_id: column.id,
            count: items
                .iter()
                .filter(|item| item.is_visible() && item.column_id == column.id)
                .count(),
        })
        .collect()
}

/// Case-insensitive name, then exact name, then id.
fn compare_swimlanes(a: &Swimlane, b: &Swimlane) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
