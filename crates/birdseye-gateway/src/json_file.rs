use async_trait::async_trait;
use birdseye_core::{BoardError, BoardResult};
use birdseye_domain::{Row, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::atomic_writer::AtomicWriter;
use crate::filter::RowFilter;
use crate::table_set::TableSet;
use crate::traits::RemoteGateway;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Process that wrote the file last.
    pub instance_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonEnvelope {
    version: u32,
    metadata: FileMetadata,
    tables: TableSet,
}

/// Offline backend keeping the three tables in one JSON file.
///
/// The file is read once on open and rewritten after every mutation.
#[derive(Debug)]
pub struct JsonFileGateway {
    path: PathBuf,
    instance_id: Uuid,
    tables: Mutex<TableSet>,
}

impl JsonFileGateway {
    /// Opens the board file, creating it with `default_columns` when absent.
    pub async fn open(path: impl AsRef<Path>, default_columns: &[String]) -> BoardResult<Self> {
        let path = path.as_ref().to_path_buf();
        let gateway = if path.exists() {
            let bytes = AtomicWriter::read_all(&path).await?;
            let envelope: JsonEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
                BoardError::Serialization(format!("invalid board file {}: {}", path.display(), e))
            })?;
            if envelope.version != FORMAT_VERSION {
                return Err(BoardError::Serialization(format!(
                    "Unsupported board file version: {}",
                    envelope.version
                )));
            }
            tracing::info!(
                "Loaded board file {} (last saved {})",
                path.display(),
                envelope.metadata.saved_at
            );
            Self::with_tables(path, envelope.tables)
        } else {
            let gateway = Self::with_tables(path, TableSet::with_columns(default_columns)?);
            gateway.persist(&*gateway.tables.lock().await).await?;
            tracing::info!("Created board file {}", gateway.path.display());
            gateway
        };
        Ok(gateway)
    }

    fn with_tables(path: PathBuf, tables: TableSet) -> Self {
        Self {
            path,
            instance_id: Uuid::new_v4(),
            tables: Mutex::new(tables),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, tables: &TableSet) -> BoardResult<()> {
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: FileMetadata {
                instance_id: self.instance_id,
                saved_at: Utc::now(),
            },
            tables: tables.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        AtomicWriter::write_atomic(&self.path, &bytes).await
    }

    /// Applies `change` to a copy of the tables and keeps it only if the
    /// file write succeeds.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut TableSet) -> BoardResult<T>,
    ) -> BoardResult<T> {
        let mut tables = self.tables.lock().await;
        let mut next = tables.clone();
        let result = change(&mut next)?;
        self.persist(&next).await?;
        *tables = next;
        Ok(result)
    }
}

#[async_trait]
impl RemoteGateway for JsonFileGateway {
    async fn fetch(&self, table: Table, filter: RowFilter) -> BoardResult<Vec<Row>> {
        Ok(self.tables.lock().await.fetch(table, &filter))
    }

    async fn insert(&self, table: Table, row: Row) -> BoardResult<Row> {
        self.mutate(|tables| tables.insert(table, row)).await
    }

    async fn upsert(&self, table: Table, rows: Vec<Row>) -> BoardResult<Vec<Row>> {
        self.mutate(|tables| tables.upsert(table, rows)).await
    }

    fn describe(&self) -> String {
        format!("board file {}", self.path.display())
    }
}
