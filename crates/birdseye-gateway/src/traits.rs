use async_trait::async_trait;
use birdseye_core::BoardResult;
use birdseye_domain::{Row, Table};

use crate::filter::RowFilter;

/// Row-level access to the remote store.
///
/// Calls are independent: there are no transactions, retries or timeouts.
/// Callers log a failure and keep their previous state.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Reads the rows of `table` matching `filter`.
    async fn fetch(&self, table: Table, filter: RowFilter) -> BoardResult<Vec<Row>>;

    /// Inserts one row and returns it as stored, including a generated id.
    async fn insert(&self, table: Table, row: Row) -> BoardResult<Row>;

    /// Inserts or patches rows by id and returns the stored rows.
    async fn upsert(&self, table: Table, rows: Vec<Row>) -> BoardResult<Vec<Row>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
