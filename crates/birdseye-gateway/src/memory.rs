use async_trait::async_trait;
use birdseye_core::BoardResult;
use birdseye_domain::{Row, Table};
use parking_lot::Mutex;

use crate::filter::RowFilter;
use crate::table_set::TableSet;
use crate::traits::RemoteGateway;

/// In-process backend. Data lives as long as the gateway.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<TableSet>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: TableSet) -> Self {
        Self {
            tables: Mutex::new(tables),
        }
    }

    pub fn tables(&self) -> TableSet {
        self.tables.lock().clone()
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn fetch(&self, table: Table, filter: RowFilter) -> BoardResult<Vec<Row>> {
        Ok(self.tables.lock().fetch(table, &filter))
    }

    async fn insert(&self, table: Table, row: Row) -> BoardResult<Row> {
        self.tables.lock().insert(table, row)
    }

    async fn upsert(&self, table: Table, rows: Vec<Row>) -> BoardResult<Vec<Row>> {
        self.tables.lock().upsert(table, rows)
    }

    fn describe(&self) -> String {
        "in-memory board".to_string()
    }
}
