//! Keyboard drag-and-drop inside one swimlane.
//!
//! `Space` picks up the highlighted card, the arrow keys move its drop
//! position across the lane's columns, `Space` drops and `Esc` cancels.
//! Every finished gesture becomes a [`DragResult`]; a cancelled one has no
//! destination, like a drop outside any column.

use birdseye_domain::{ColumnView, DragLocation, DragResult, Item, ItemId, SwimlaneId, SwimlaneView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub swimlane_id: SwimlaneId,
    pub item_id: ItemId,
    pub name: String,
    pub source: DragLocation,
    /// Column index inside the lane the card hovers over.
    pub column: usize,
    /// Position in the hovered column once the card has left its source.
    pub index: usize,
}

/// One row of a column while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Card(&'a Item),
    Ghost,
}

impl DragState {
    pub fn pick_up(lane: &SwimlaneView, column: usize, card: usize) -> Option<Self> {
        if !lane.swimlane.is_open {
            return None;
        }
        let cell = lane.columns.get(column)?;
        let item = cell.items.get(card)?;
        Some(Self {
            swimlane_id: lane.swimlane.id,
            item_id: item.id,
            name: item.name.clone(),
            source: DragLocation {
                column_id: cell.column.id,
                index: card,
            },
            column,
            index: card,
        })
    }

    pub fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn down(&mut self, lane: &SwimlaneView) {
        self.index = (self.index + 1).min(self.max_index(lane, self.column));
    }

    pub fn left(&mut self, lane: &SwimlaneView) {
        if self.column > 0 {
            self.hover(lane, self.column - 1);
        }
    }

    pub fn right(&mut self, lane: &SwimlaneView) {
        if self.column + 1 < lane.columns.len() {
            self.hover(lane, self.column + 1);
        }
    }

    /// Where the card would land, or `None` when the hovered column is gone.
    pub fn target(&self, lane: &SwimlaneView) -> Option<DragLocation> {
        if lane.swimlane.id != self.swimlane_id {
            return None;
        }
        let cell = lane.columns.get(self.column)?;
        Some(DragLocation {
            column_id: cell.column.id,
            index: self.index.min(self.max_index(lane, self.column)),
        })
    }

    pub fn drop(&self, lane: &SwimlaneView) -> DragResult {
        DragResult {
            item_id: self.item_id,
            source: self.source,
            destination: self.target(lane),
        }
    }

    pub fn cancel(&self) -> DragResult {
        DragResult {
            item_id: self.item_id,
            source: self.source,
            destination: None,
        }
    }

    /// Rows of `cell` with the dragged card shown at its drop position.
    pub fn slots<'a>(&self, column: usize, cell: &'a ColumnView) -> Vec<Slot<'a>> {
        let mut slots: Vec<Slot<'a>> = cell
            .items
            .iter()
            .filter(|item| item.id != self.item_id)
            .map(Slot::Card)
            .collect();
        if column == self.column {
            let at = self.index.min(slots.len());
            slots.insert(at, Slot::Ghost);
        }
        slots
    }

    fn hover(&mut self, lane: &SwimlaneView, column: usize) {
        self.column = column;
        self.index = self.index.min(self.max_index(lane, column));
    }

    /// Last valid drop index: the source column loses the dragged card
    /// before it is reinserted.
    fn max_index(&self, lane: &SwimlaneView, column: usize) -> usize {
        lane.columns
            .get(column)
            .map(|cell| {
                let len = cell.items.len();
                if cell.column.id == self.source.column_id {
                    len.saturating_sub(1)
                } else {
                    len
                }
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdseye_domain::{BoardState, Column, Item, Swimlane};

    fn board() -> BoardState {
        let lane = Swimlane::new("Web");
        let columns = vec![Column::new("Todo"), Column::new("Doing"), Column::new("Done")];
        let items = vec![
            Item::new(lane.id, columns[0].id, "a", 0),
            Item::new(lane.id, columns[0].id, "b", 1),
            Item::new(lane.id, columns[0].id, "c", 2),
            Item::new(lane.id, columns[1].id, "d", 0),
        ];
        BoardState::new(vec![lane], columns, items)
    }

    #[test]
    fn test_moving_within_source_column_stops_at_last_slot() {
        let state = board();
        let lane = &state.view().swimlanes[0];
        let mut drag = DragState::pick_up(lane, 0, 0).unwrap();
        for _ in 0..5 {
            drag.down(lane);
        }
        let result = drag.drop(lane);
        assert_eq!(result.destination.unwrap().index, 2);
        assert_eq!(result.source.index, 0);
    }

    #[test]
    fn test_other_column_allows_appending() {
        let state = board();
        let lane = &state.view().swimlanes[0];
        let mut drag = DragState::pick_up(lane, 0, 2).unwrap();
        drag.right(lane);
        assert_eq!(drag.index, 1);
        drag.down(lane);
        assert_eq!(drag.index, 1);
        drag.up();
        assert_eq!(drag.index, 0);

        let result = drag.drop(lane);
        assert_eq!(
            result.destination,
            Some(DragLocation {
                column_id: lane.columns[1].column.id,
                index: 0
            })
        );
    }

    #[test]
    fn test_cancel_has_no_destination() {
        let state = board();
        let lane = &state.view().swimlanes[0];
        let mut drag = DragState::pick_up(lane, 0, 1).unwrap();
        drag.right(lane);
        let result = drag.cancel();
        assert_eq!(result.item_id, lane.columns[0].items[1].id);
        assert!(result.destination.is_none());
    }

    #[test]
    fn test_slots_show_ghost_at_drop_position() {
        let state = board();
        let lane = &state.view().swimlanes[0];
        let mut drag = DragState::pick_up(lane, 0, 0).unwrap();
        drag.down(lane);

        let names: Vec<_> = drag
            .slots(0, &lane.columns[0])
            .into_iter()
            .map(|slot| match slot {
                Slot::Card(item) => item.name.as_str(),
                Slot::Ghost => "*",
            })
            .collect();
        assert_eq!(names, vec!["b", "*", "c"]);
        assert_eq!(drag.slots(1, &lane.columns[1]).len(), 1);
    }

    #[test]
    fn test_empty_cell_cannot_be_picked_up() {
        let state = board();
        let lane = &state.view().swimlanes[0];
        assert!(DragState::pick_up(lane, 2, 0).is_none());
        assert!(DragState::pick_up(lane, 7, 0).is_none());
    }

    #[test]
    fn test_drop_applies_through_the_reconciler() {
        let state = board();
        let lane = &state.view().swimlanes[0];
        let mut drag = DragState::pick_up(lane, 0, 0).unwrap();
        drag.right(lane);
        drag.down(lane);

        let reorder = state
            .apply_drag(lane.swimlane.id, &drag.drop(lane))
            .unwrap()
            .unwrap();
        let doing: Vec<_> = reorder.state.view().swimlanes[0].columns[1]
            .items
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(doing, vec!["d", "a"]);
    }
}
