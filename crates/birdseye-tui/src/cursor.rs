use birdseye_domain::{BoardView, Item, ItemId, SwimlaneView};

/// Position of the highlighted card on the board: swimlane row, column,
/// and card inside that cell.
///
/// The cursor is kept as indices into the derived view and clamped every
/// time the view changes, so it survives filtering and remote updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCursor {
    pub lane: usize,
    pub column: usize,
    pub card: usize,
}

impl BoardCursor {
    pub fn clamp(&mut self, view: &BoardView) {
        self.lane = self.lane.min(view.swimlanes.len().saturating_sub(1));
        let Some(lane) = view.swimlanes.get(self.lane) else {
            *self = Self::default();
            return;
        };
        self.column = self.column.min(lane.columns.len().saturating_sub(1));
        self.card = self.card.min(cell_len(lane, self.column).saturating_sub(1));
    }

    pub fn up(&mut self, view: &BoardView) {
        if self.card > 0 {
            self.card -= 1;
        } else if self.lane > 0 {
            self.lane -= 1;
            self.card = view
                .swimlanes
                .get(self.lane)
                .map(|lane| cell_len(lane, self.column).saturating_sub(1))
                .unwrap_or(0);
        }
        self.clamp(view);
    }

    pub fn down(&mut self, view: &BoardView) {
        let len = view
            .swimlanes
            .get(self.lane)
            .map(|lane| cell_len(lane, self.column))
            .unwrap_or(0);
        if self.card + 1 < len {
            self.card += 1;
        } else if self.lane + 1 < view.swimlanes.len() {
            self.lane += 1;
            self.card = 0;
        }
        self.clamp(view);
    }

    pub fn left(&mut self, view: &BoardView) {
        self.column = self.column.saturating_sub(1);
        self.clamp(view);
    }

    pub fn right(&mut self, view: &BoardView) {
        self.column += 1;
        self.clamp(view);
    }

    pub fn swimlane<'a>(&self, view: &'a BoardView) -> Option<&'a SwimlaneView> {
        view.swimlanes.get(self.lane)
    }

    pub fn item<'a>(&self, view: &'a BoardView) -> Option<&'a Item> {
        let lane = self.swimlane(view)?;
        if !lane.swimlane.is_open {
            return None;
        }
        lane.columns.get(self.column)?.items.get(self.card)
    }

    /// Moves onto `item_id` if the view shows it.
    pub fn follow(&mut self, view: &BoardView, item_id: ItemId) -> bool {
        for (lane_index, lane) in view.swimlanes.iter().enumerate() {
            for (column_index, column) in lane.columns.iter().enumerate() {
                if let Some(card) = column.items.iter().position(|item| item.id == item_id) {
                    *self = Self {
                        lane: lane_index,
                        column: column_index,
                        card,
                    };
                    return true;
                }
            }
        }
        false
    }
}

/// Cards a cursor can land on. Collapsed swimlanes show none.
fn cell_len(lane: &SwimlaneView, column: usize) -> usize {
    if !lane.swimlane.is_open {
        return 0;
    }
    lane.columns
        .get(column)
        .map(|column| column.items.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdseye_domain::{BoardState, Column, Item, Swimlane};

    fn board() -> BoardState {
        let api = Swimlane::new("Api");
        let web = Swimlane::new("Web");
        let columns = vec![Column::new("Todo"), Column::new("Done")];
        let items = vec![
            Item::new(api.id, columns[0].id, "a1", 0),
            Item::new(api.id, columns[0].id, "a2", 1),
            Item::new(web.id, columns[0].id, "w1", 0),
            Item::new(web.id, columns[1].id, "w2", 0),
        ];
        BoardState::new(vec![web, api], columns, items)
    }

    #[test]
    fn test_down_walks_cards_then_lanes() {
        let state = board();
        let view = state.view();
        let mut cursor = BoardCursor::default();

        assert_eq!(cursor.item(view).unwrap().name, "a1");
        cursor.down(view);
        assert_eq!(cursor.item(view).unwrap().name, "a2");
        cursor.down(view);
        assert_eq!(cursor.item(view).unwrap().name, "w1");
        cursor.down(view);
        assert_eq!(cursor.item(view).unwrap().name, "w1");

        cursor.up(view);
        assert_eq!(cursor.item(view).unwrap().name, "a2");
    }

    #[test]
    fn test_horizontal_moves_clamp_the_card() {
        let state = board();
        let view = state.view();
        let mut cursor = BoardCursor {
            lane: 0,
            column: 0,
            card: 1,
        };
        cursor.right(view);
        assert_eq!((cursor.column, cursor.card), (1, 0));
        assert!(cursor.item(view).is_none());
        cursor.right(view);
        assert_eq!(cursor.column, 1);
        cursor.left(view);
        cursor.left(view);
        assert_eq!(cursor.column, 0);
    }

    #[test]
    fn test_closed_lane_hides_cards() {
        let mut state = board();
        let web = state.view().swimlanes[1].swimlane.id;
        let lanes = state
            .swimlanes()
            .iter()
            .cloned()
            .map(|mut lane| {
                if lane.id == web {
                    lane.is_open = false;
                }
                lane
            })
            .collect();
        state = state.with_swimlanes(lanes);

        let mut cursor = BoardCursor {
            lane: 1,
            column: 1,
            card: 0,
        };
        cursor.clamp(state.view());
        assert!(cursor.item(state.view()).is_none());
    }

    #[test]
    fn test_follow_finds_moved_card() {
        let state = board();
        let view = state.view();
        let target = view.swimlanes[1].columns[1].items[0].id;
        let mut cursor = BoardCursor::default();
        assert!(cursor.follow(view, target));
        assert_eq!(
            cursor,
            BoardCursor {
                lane: 1,
                column: 1,
                card: 0
            }
        );
    }

    #[test]
    fn test_empty_board_resets() {
        let state = BoardState::default();
        let mut cursor = BoardCursor {
            lane: 3,
            column: 2,
            card: 1,
        };
        cursor.clamp(state.view());
        assert_eq!(cursor, BoardCursor::default());
    }
}
