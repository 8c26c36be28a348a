use birdseye_core::{BoardError, BoardResult};
use birdseye_domain::{
    BoardState, DragResult, Item, ItemId, ItemUpdate, Row, Swimlane, SwimlaneId, SwimlaneUpdate,
    Table, TableRow,
};
use birdseye_gateway::{RemoteGateway, RowFilter};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::event::{Action, RemoteEvent};

/// Owns the current board snapshot and the write queue to the backend.
///
/// Writes are fire-and-forget: no retry, no cancellation, no ordering
/// between concurrent writes. A failed write is logged and leaves the
/// snapshot as it was; optimistic reorders are not rolled back.
pub struct BoardStore {
    state: Arc<BoardState>,
    gateway: Arc<dyn RemoteGateway>,
    events_tx: mpsc::UnboundedSender<RemoteEvent>,
    events_rx: mpsc::UnboundedReceiver<RemoteEvent>,
    in_flight: usize,
    last_error: Option<String>,
}

impl BoardStore {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(BoardState::default()),
            gateway,
            events_tx,
            events_rx,
            in_flight: 0,
            last_error: None,
        }
    }

    /// Reads all three tables and replaces the base collections. The filter
    /// survives a reload.
    pub async fn load(&mut self) -> BoardResult<()> {
        let gateway = &self.gateway;
        let (swimlanes, columns, items) = futures::try_join!(
            gateway.fetch(Table::Swimlanes, RowFilter::all().order_by("name")),
            gateway.fetch(Table::Columns, RowFilter::all()),
            gateway.fetch(Table::Items, RowFilter::all().order_by("sort_order")),
        )?;

        let swimlanes = from_rows(swimlanes)?;
        let columns = from_rows(columns)?;
        let items = from_rows(items)?;
        tracing::info!(
            "Loaded {} swimlanes, {} columns, {} items from {}",
            swimlanes.len(),
            columns.len(),
            items.len(),
            self.gateway.describe()
        );

        let filter = self.state.filter().to_string();
        self.state = Arc::new(BoardState::new(swimlanes, columns, items).with_filter(filter));
        Ok(())
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn snapshot(&self) -> Arc<BoardState> {
        Arc::clone(&self.state)
    }

    /// Writes dispatched but not yet applied.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.state = Arc::new(self.state.with_filter(filter));
    }

    pub fn add_swimlane(&mut self, name: &str) -> BoardResult<()> {
        let name = required_name(name, "swimlane")?;
        let row = Swimlane::new(name).to_row()?;
        let gateway = Arc::clone(&self.gateway);
        self.dispatch(Action::AddSwimlane, Table::Swimlanes, async move {
            gateway.insert(Table::Swimlanes, row).await.map(|row| vec![row])
        });
        Ok(())
    }

    pub fn update_swimlane(&mut self, id: SwimlaneId, update: SwimlaneUpdate) -> BoardResult<()> {
        self.require_swimlane(id)?;
        if update.is_empty() {
            return Err(BoardError::Validation("nothing to update".into()));
        }
        if let Some(name) = &update.name {
            required_name(name, "swimlane")?;
        }
        self.upsert(Action::UpdateSwimlane, Table::Swimlanes, vec![update.to_row(id)]);
        Ok(())
    }

    /// Soft-deletes an empty swimlane.
    pub fn delete_swimlane(&mut self, id: SwimlaneId) -> BoardResult<()> {
        let lane = self.require_swimlane(id)?;
        if self.state.swimlane_has_items(id) {
            return Err(BoardError::Validation(format!(
                "swimlane '{}' still has cards",
                lane.name
            )));
        }
        self.upsert(
            Action::DeleteSwimlane,
            Table::Swimlanes,
            vec![SwimlaneUpdate::deactivate().to_row(id)],
        );
        Ok(())
    }

    /// Adds a card at the bottom of the first column of `swimlane_id`.
    pub fn add_card(
        &mut self,
        swimlane_id: SwimlaneId,
        name: &str,
        description: &str,
    ) -> BoardResult<()> {
        let lane = self.require_swimlane(swimlane_id)?;
        if !lane.is_active {
            return Err(BoardError::Validation(format!(
                "swimlane '{}' was deleted",
                lane.name
            )));
        }
        let name = required_name(name, "card")?;
        let column_id = self
            .state
            .active_columns()
            .next()
            .map(|column| column.id)
            .ok_or_else(|| BoardError::NotFound("no active column".into()))?;
        let sort_order = self.state.next_sort_order(swimlane_id, column_id);
        let row = Item::new(swimlane_id, column_id, name, sort_order)
            .with_description(description)
            .to_row()?;

        let gateway = Arc::clone(&self.gateway);
        self.dispatch(Action::AddCard, Table::Items, async move {
            gateway.insert(Table::Items, row).await.map(|row| vec![row])
        });
        Ok(())
    }

    pub fn update_card(&mut self, id: ItemId, name: &str, description: &str) -> BoardResult<()> {
        self.require_item(id)?;
        let name = required_name(name, "card")?;
        self.upsert(
            Action::UpdateCard,
            Table::Items,
            vec![ItemUpdate::content(name, description).to_row(id)],
        );
        Ok(())
    }

    /// Soft-deletes a card.
    pub fn delete_card(&mut self, id: ItemId) -> BoardResult<()> {
        self.require_item(id)?;
        self.upsert(
            Action::DeleteCard,
            Table::Items,
            vec![ItemUpdate::soft_delete().to_row(id)],
        );
        Ok(())
    }

    /// Archives every card of the completed column and returns how many
    /// were sent.
    pub fn archive_completed(&mut self) -> usize {
        let rows = self.state.archive_completed_rows();
        let count = rows.len();
        if count > 0 {
            self.upsert(Action::ArchiveCompleted, Table::Items, rows);
        }
        count
    }

    /// Reconciles a finished drag inside `swimlane_id`.
    ///
    /// The new order is applied at once and persisted with one batch
    /// upsert. Returns `false` for a drop outside any column.
    pub fn handle_drag_end(
        &mut self,
        swimlane_id: SwimlaneId,
        drag: &DragResult,
    ) -> BoardResult<bool> {
        let Some(reorder) = self.state.apply_drag(swimlane_id, drag)? else {
            return Ok(false);
        };
        tracing::debug!(
            "Moved card {} into column {} ({} rows to persist)",
            drag.item_id,
            reorder.column_id,
            reorder.rows.len()
        );
        self.state = Arc::new(reorder.state);
        self.upsert(Action::Reorder, Table::Items, reorder.rows);
        Ok(true)
    }

    /// Waits for the next completed write. Pair with [`BoardStore::apply`].
    pub async fn next_event(&mut self) -> Option<RemoteEvent> {
        self.events_rx.recv().await
    }

    /// Applies every completed write without waiting. Returns how many were
    /// applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits until every dispatched write has completed and been applied.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.events_rx.recv().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
    }

    /// Folds a completed write into the snapshot. Returns `true` when the
    /// snapshot changed.
    pub fn apply(&mut self, event: RemoteEvent) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        let RemoteEvent {
            action,
            table,
            result,
        } = event;
        let merged = result.and_then(|rows| self.state.merge_rows(table, rows));
        match merged {
            Ok(state) => {
                tracing::debug!("{} applied to {}", action, table);
                self.state = Arc::new(state);
                true
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", action, e);
                self.last_error = Some(format!("{} failed: {}", action, e));
                false
            }
        }
    }

    fn upsert(&mut self, action: Action, table: Table, rows: Vec<Row>) {
        let gateway = Arc::clone(&self.gateway);
        self.dispatch(action, table, async move { gateway.upsert(table, rows).await });
    }

    fn dispatch<F>(&mut self, action: Action, table: Table, write: F)
    where
        F: Future<Output = BoardResult<Vec<Row>>> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.events_tx.clone();
        tracing::debug!("Dispatching {}", action);
        tokio::spawn(async move {
            let result = write.await;
            // The receiver lives in the store; a send only fails during shutdown.
            if tx
                .send(RemoteEvent {
                    action,
                    table,
                    result,
                })
                .is_err()
            {
                tracing::debug!("{} finished after the store was dropped", action);
            }
        });
    }

    fn require_swimlane(&self, id: SwimlaneId) -> BoardResult<&Swimlane> {
        self.state
            .swimlane(id)
            .ok_or_else(|| BoardError::NotFound(format!("swimlane {}", id)))
    }

    fn require_item(&self, id: ItemId) -> BoardResult<&Item> {
        self.state
            .item(id)
            .filter(|item| item.is_active)
            .ok_or_else(|| BoardError::NotFound(format!("card {}", id)))
    }
}

fn required_name<'a>(name: &'a str, what: &str) -> BoardResult<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        Err(BoardError::Validation(format!("{} name cannot be empty", what)))
    } else {
        Ok(name)
    }
}

fn from_rows<T: TableRow>(rows: Vec<Row>) -> BoardResult<Vec<T>> {
    rows.into_iter().map(T::from_row).collect()
}
