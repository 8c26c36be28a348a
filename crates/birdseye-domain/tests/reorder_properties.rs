use birdseye_domain::*;

struct Board {
    state: BoardState,
    lane: SwimlaneId,
    a: ColumnId,
    b: ColumnId,
}

fn board() -> Board {
    let lane = Swimlane::new("Product");
    let other = Swimlane::new("Infra");
    let a = Column::new("A");
    let b = Column::new("B");
    let items = vec![
        Item::new(lane.id, a.id, "a0", 0),
        Item::new(lane.id, a.id, "a1", 1),
        Item::new(lane.id, a.id, "a2", 2),
        Item::new(lane.id, a.id, "a3", 3),
        Item::new(lane.id, b.id, "b0", 0),
        Item::new(lane.id, b.id, "b1", 1),
        Item::new(other.id, b.id, "infra", 0),
    ];
    Board {
        lane: lane.id,
        a: a.id,
        b: b.id,
        state: BoardState::new(vec![lane, other], vec![a, b], items),
    }
}

fn cell(state: &BoardState, lane: SwimlaneId, column: ColumnId) -> Vec<Item> {
    state
        .view()
        .swimlane(lane)
        .unwrap()
        .column(column)
        .unwrap()
        .items
        .clone()
}

fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}

#[test]
fn test_cross_column_example() {
    let board = board();
    let moving = cell(&board.state, board.lane, board.a)[2].id;
    let drag = DragResult {
        item_id: moving,
        source: DragLocation {
            column_id: board.a,
            index: 2,
        },
        destination: Some(DragLocation {
            column_id: board.b,
            index: 0,
        }),
    };

    let reorder = board.state.apply_drag(board.lane, &drag).unwrap().unwrap();

    let a = cell(&reorder.state, board.lane, board.a);
    let b = cell(&reorder.state, board.lane, board.b);
    assert_eq!(names(&a), vec!["a0", "a1", "a3"]);
    assert_eq!(names(&b), vec!["a2", "b0", "b1"]);
    assert_eq!(b[0].sort_order, 0);
    assert_eq!(b[1].sort_order, 1);
    assert_eq!(b[2].sort_order, 2);

    // The source column is not compacted.
    assert_eq!(a[2].sort_order, 3);

    // Other lanes sharing the column are untouched.
    let infra = board.state.swimlanes()[1].id;
    assert_eq!(cell(&reorder.state, infra, board.b)[0].sort_order, 0);
}

#[test]
fn test_drop_outside_changes_nothing() {
    let board = board();
    let drag = DragResult {
        item_id: cell(&board.state, board.lane, board.a)[0].id,
        source: DragLocation {
            column_id: board.a,
            index: 0,
        },
        destination: None,
    };

    assert!(board.state.apply_drag(board.lane, &drag).unwrap().is_none());
}

#[test]
fn test_every_valid_drag_keeps_cell_invariants() {
    let board = board();
    let columns = [board.a, board.b];

    for &from in &columns {
        let source_len = cell(&board.state, board.lane, from).len();
        for src_index in 0..source_len {
            for &to in &columns {
                let dest_len = cell(&board.state, board.lane, to).len();
                let max_index = if from == to { dest_len - 1 } else { dest_len };
                for dest_index in 0..=max_index {
                    let moving = cell(&board.state, board.lane, from)[src_index].id;
                    let drag = DragResult {
                        item_id: moving,
                        source: DragLocation {
                            column_id: from,
                            index: src_index,
                        },
                        destination: Some(DragLocation {
                            column_id: to,
                            index: dest_index,
                        }),
                    };

                    let reorder = board.state.apply_drag(board.lane, &drag).unwrap().unwrap();
                    let dest = cell(&reorder.state, board.lane, to);

                    let hits: Vec<usize> = dest
                        .iter()
                        .enumerate()
                        .filter(|(_, item)| item.id == moving)
                        .map(|(i, _)| i)
                        .collect();
                    assert_eq!(hits, vec![dest_index]);

                    if from != to {
                        let source = cell(&reorder.state, board.lane, from);
                        assert!(source.iter().all(|item| item.id != moving));
                        assert_eq!(source.len(), source_len - 1);
                    }

                    let orders: Vec<i32> = dest.iter().map(|item| item.sort_order).collect();
                    let expected: Vec<i32> = (0..dest.len() as i32).collect();
                    assert_eq!(orders, expected);

                    assert_eq!(reorder.rows.len(), dest.len());
                    for (row, item) in reorder.rows.iter().zip(&dest) {
                        assert_eq!(row["id"], item.id.to_string());
                        assert_eq!(row["column_id"], to.to_string());
                        assert_eq!(row["sort_order"], item.sort_order);
                    }
                }
            }
        }
    }
}

#[test]
fn test_drag_with_filter_only_reindexes_visible_cards() {
    let board = board();
    let state = board.state.with_filter("a");
    let visible = cell(&state, board.lane, board.a);
    assert_eq!(visible.len(), 4);

    let drag = DragResult {
        item_id: visible[3].id,
        source: DragLocation {
            column_id: board.a,
            index: 3,
        },
        destination: Some(DragLocation {
            column_id: board.a,
            index: 0,
        }),
    };
    let reorder = state.apply_drag(board.lane, &drag).unwrap().unwrap();

    assert_eq!(reorder.state.filter(), "a");
    assert_eq!(
        names(&cell(&reorder.state, board.lane, board.a)),
        vec!["a3", "a0", "a1", "a2"]
    );
}

#[test]
fn test_out_of_range_source_is_not_found() {
    let board = board();
    let drag = DragResult {
        item_id: uuid::Uuid::new_v4(),
        source: DragLocation {
            column_id: board.b,
            index: 5,
        },
        destination: Some(DragLocation {
            column_id: board.a,
            index: 0,
        }),
    };
    assert!(matches!(
        board.state.apply_drag(board.lane, &drag),
        Err(birdseye_core::BoardError::NotFound(_))
    ));
}
