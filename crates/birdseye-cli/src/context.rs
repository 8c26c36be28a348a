use anyhow::Context;
use birdseye_core::{AppConfig, BoardError};
use birdseye_domain::{BoardState, ColumnId, Item, ItemId, Swimlane, SwimlaneId};
use birdseye_gateway::{JsonFileGateway, MemoryGateway, RemoteGateway, RestGateway, TableSet};
use birdseye_richtext::Document;
use birdseye_state::BoardStore;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the board rows live for this run.
#[derive(Debug, Clone)]
pub enum Backend {
    Rest,
    File(PathBuf),
    Memory,
}

impl Backend {
    pub fn from_flags(file: Option<PathBuf>, memory: bool) -> Self {
        match (file, memory) {
            (Some(path), _) => Backend::File(path),
            (None, true) => Backend::Memory,
            (None, false) => Backend::Rest,
        }
    }

    pub async fn connect(&self, config: &AppConfig) -> anyhow::Result<Arc<dyn RemoteGateway>> {
        let columns = &config.board.default_columns;
        let gateway: Arc<dyn RemoteGateway> = match self {
            Backend::Rest => Arc::new(
                RestGateway::from_config(&config.backend)
                    .context("Backend is not configured; use --file or --memory to work offline")?,
            ),
            Backend::File(path) => Arc::new(
                JsonFileGateway::open(path, columns)
                    .await
                    .with_context(|| format!("Failed to open board file {}", path.display()))?,
            ),
            Backend::Memory => Arc::new(MemoryGateway::with_tables(TableSet::with_columns(
                columns,
            )?)),
        };
        tracing::debug!("Using {}", gateway.describe());
        Ok(gateway)
    }
}

/// A card as printed by the CLI, with its description also given as
/// markdown.
#[derive(Debug, Serialize)]
pub struct CardOutput {
    pub id: ItemId,
    pub swimlane_id: SwimlaneId,
    pub column_id: ColumnId,
    pub name: String,
    pub description: String,
    pub description_md: String,
    pub sort_order: i32,
}

impl From<&Item> for CardOutput {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            swimlane_id: item.swimlane_id,
            column_id: item.column_id,
            name: item.name.clone(),
            description: item.description.clone(),
            description_md: Document::from_html(&item.description).to_markdown(),
            sort_order: item.sort_order,
        }
    }
}

pub struct CliContext {
    pub store: BoardStore,
}

impl CliContext {
    pub async fn load(gateway: Arc<dyn RemoteGateway>) -> anyhow::Result<Self> {
        let mut store = BoardStore::new(gateway);
        store.load().await.context("Failed to load the board")?;
        Ok(Self { store })
    }

    pub fn state(&self) -> &BoardState {
        self.store.state()
    }

    /// Waits for every dispatched write and fails if any of them did.
    pub async fn commit(&mut self) -> anyhow::Result<()> {
        self.store.settle().await;
        match self.store.last_error() {
            Some(error) => Err(anyhow::anyhow!("{}", error)),
            None => Ok(()),
        }
    }

    pub fn card(&self, id: ItemId) -> anyhow::Result<&Item> {
        self.state()
            .item(id)
            .filter(|item| item.is_visible())
            .ok_or_else(|| BoardError::NotFound(format!("card {}", id)).into())
    }

    pub fn swimlane(&self, id: SwimlaneId) -> anyhow::Result<&Swimlane> {
        self.state()
            .swimlane(id)
            .filter(|lane| lane.is_active)
            .ok_or_else(|| BoardError::NotFound(format!("swimlane {}", id)).into())
    }

    pub fn item_ids(&self) -> HashSet<ItemId> {
        self.state().items().iter().map(|item| item.id).collect()
    }

    pub fn swimlane_ids(&self) -> HashSet<SwimlaneId> {
        self.state().swimlanes().iter().map(|lane| lane.id).collect()
    }

    /// The card that appeared since `before` was taken.
    pub fn new_card(&self, before: &HashSet<ItemId>) -> anyhow::Result<&Item> {
        self.state()
            .items()
            .iter()
            .find(|item| !before.contains(&item.id))
            .ok_or_else(|| anyhow::anyhow!("Backend did not return the new card"))
    }

    pub fn new_swimlane(&self, before: &HashSet<SwimlaneId>) -> anyhow::Result<&Swimlane> {
        self.state()
            .swimlanes()
            .iter()
            .find(|lane| !before.contains(&lane.id))
            .ok_or_else(|| anyhow::anyhow!("Backend did not return the new swimlane"))
    }
}
