use async_trait::async_trait;
use birdseye_core::{BoardError, BoardResult};
use birdseye_domain::{Column, DragLocation, DragResult, Item, Row, Swimlane, Table, TableRow};
use birdseye_gateway::{RemoteGateway, RowFilter};
use birdseye_state::BoardStore;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Gateway {}

    #[async_trait]
    impl RemoteGateway for Gateway {
        async fn fetch(&self, table: Table, filter: RowFilter) -> BoardResult<Vec<Row>>;
        async fn insert(&self, table: Table, row: Row) -> BoardResult<Row>;
        async fn upsert(&self, table: Table, rows: Vec<Row>) -> BoardResult<Vec<Row>>;
        fn describe(&self) -> String;
    }
}

struct Fixture {
    lane: Swimlane,
    columns: Vec<Column>,
    items: Vec<Item>,
}

impl Fixture {
    fn new() -> Self {
        let lane = Swimlane::new("Web");
        let columns = vec![Column::new("Todo"), Column::new("Done")];
        let items = vec![
            Item::new(lane.id, columns[0].id, "a", 0),
            Item::new(lane.id, columns[0].id, "b", 1),
        ];
        Self {
            lane,
            columns,
            items,
        }
    }

    fn gateway(&self) -> MockGateway {
        let lanes = rows(std::slice::from_ref(&self.lane));
        let columns = rows(&self.columns);
        let items = rows(&self.items);
        let mut gateway = MockGateway::new();
        gateway
            .expect_fetch()
            .returning(move |table, _| {
                Ok(match table {
                    Table::Swimlanes => lanes.clone(),
                    Table::Columns => columns.clone(),
                    Table::Items => items.clone(),
                })
            });
        gateway
            .expect_describe()
            .return_const("mock backend".to_string());
        gateway
    }
}

fn rows<T: TableRow>(entities: &[T]) -> Vec<Row> {
    entities.iter().map(|e| e.to_row().unwrap()).collect()
}

async fn loaded(gateway: MockGateway) -> BoardStore {
    let mut store = BoardStore::new(Arc::new(gateway));
    store.load().await.unwrap();
    store
}

#[tokio::test]
async fn failed_insert_leaves_snapshot_unchanged() {
    let fixture = Fixture::new();
    let mut gateway = fixture.gateway();
    gateway
        .expect_insert()
        .times(1)
        .returning(|_, _| Err(BoardError::Connection("connection reset".into())));
    let mut store = loaded(gateway).await;
    let before = store.snapshot();

    store.add_card(fixture.lane.id, "c", "").unwrap();
    store.settle().await;

    assert_eq!(*store.snapshot(), *before);
    assert!(store.last_error().unwrap().contains("add card failed"));
}

#[tokio::test]
async fn failed_reorder_is_not_rolled_back() {
    let fixture = Fixture::new();
    let mut gateway = fixture.gateway();
    gateway.expect_upsert().times(1).returning(|_, _| {
        Err(BoardError::Remote {
            status: 409,
            message: "conflict".into(),
        })
    });
    let mut store = loaded(gateway).await;
    let moved = fixture.items[0].id;

    let drag = DragResult {
        item_id: moved,
        source: DragLocation {
            column_id: fixture.columns[0].id,
            index: 0,
        },
        destination: Some(DragLocation {
            column_id: fixture.columns[1].id,
            index: 0,
        }),
    };
    assert!(store.handle_drag_end(fixture.lane.id, &drag).unwrap());
    store.settle().await;

    assert_eq!(store.state().item(moved).unwrap().column_id, fixture.columns[1].id);
    assert!(store.last_error().unwrap().contains("conflict"));
}

#[tokio::test]
async fn reorder_sends_one_batch_for_the_destination_list() {
    let fixture = Fixture::new();
    let mut gateway = fixture.gateway();
    let done = fixture.columns[1].id;
    gateway
        .expect_upsert()
        .times(1)
        .withf(move |table, rows| {
            *table == Table::Items
                && rows.len() == 1
                && rows[0]["column_id"] == done.to_string()
                && rows[0]["sort_order"] == 0
        })
        .returning(|_, rows| Ok(rows));
    let mut store = loaded(gateway).await;

    let drag = DragResult {
        item_id: fixture.items[1].id,
        source: DragLocation {
            column_id: fixture.columns[0].id,
            index: 1,
        },
        destination: Some(DragLocation {
            column_id: done,
            index: 5,
        }),
    };
    store.handle_drag_end(fixture.lane.id, &drag).unwrap();
    store.settle().await;

    assert!(store.last_error().is_none());
    assert_eq!(store.state().view().swimlanes[0].columns[1].items.len(), 1);
}

#[tokio::test]
async fn malformed_response_is_reported_not_applied() {
    let fixture = Fixture::new();
    let mut gateway = fixture.gateway();
    gateway.expect_upsert().returning(|_, _| {
        let mut row = Row::new();
        row.insert("name".into(), "no id".into());
        Ok(vec![row])
    });
    let mut store = loaded(gateway).await;
    let before = store.snapshot();

    store
        .update_card(fixture.items[0].id, "renamed", "")
        .unwrap();
    store.settle().await;

    assert_eq!(*store.snapshot(), *before);
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn load_failure_is_returned() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch()
        .returning(|_, _| Err(BoardError::Connection("dns".into())));
    gateway
        .expect_describe()
        .return_const("mock backend".to_string());
    let mut store = BoardStore::new(Arc::new(gateway));

    let result = store.load().await;

    assert!(matches!(result, Err(BoardError::Connection(_))));
    assert!(store.state().swimlanes().is_empty());
}
