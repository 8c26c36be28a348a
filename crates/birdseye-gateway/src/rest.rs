use async_trait::async_trait;
use birdseye_core::{BackendConfig, BoardError, BoardResult};
use birdseye_domain::{Row, Table};
use reqwest::{RequestBuilder, Response};

use crate::filter::RowFilter;
use crate::traits::RemoteGateway;

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// PostgREST backend of the hosted store.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bearer: String,
}

impl RestGateway {
    pub fn new(base_url: &str, api_key: &str, bearer: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer: bearer.to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> BoardResult<Self> {
        Ok(Self::new(
            config.base_url()?,
            config.api_key()?,
            config.bearer_token()?,
        ))
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    async fn send(&self, request: RequestBuilder) -> BoardResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| BoardError::Connection(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BoardError::Remote {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn rows(response: Response) -> BoardResult<Vec<Row>> {
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| BoardError::Serialization(format!("unexpected response body: {}", e)))
    }
}

/// PostgREST errors carry a JSON `message`; anything else is passed through.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl RemoteGateway for RestGateway {
    async fn fetch(&self, table: Table, filter: RowFilter) -> BoardResult<Vec<Row>> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&filter.query_pairs());
        let rows = Self::rows(self.send(request).await?).await?;
        tracing::debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> BoardResult<Row> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);
        Self::rows(self.send(request).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BoardError::Remote {
                status: 200,
                message: format!("insert into {} returned no row", table),
            })
    }

    async fn upsert(&self, table: Table, rows: Vec<Row>) -> BoardResult<Vec<Row>> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", MERGE_DUPLICATES)
            .json(&rows);
        let stored = Self::rows(self.send(request).await?).await?;
        tracing::debug!("Upserted {} rows into {}", stored.len(), table);
        Ok(stored)
    }

    fn describe(&self) -> String {
        format!("REST backend {}", self.base_url)
    }
}
