//! Card images held in object storage.

use async_trait::async_trait;
use birdseye_core::{AppConfig, BoardError, BoardResult};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Fetches the bytes of a stored image by its object id.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, id: &str) -> BoardResult<Vec<u8>>;
}

/// Object storage reached through a short-lived signed URL.
#[derive(Debug, Clone)]
pub struct SignedUrlImageSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bearer: String,
    bucket: String,
    ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

impl SignedUrlImageSource {
    pub fn new(base_url: &str, api_key: &str, bearer: &str, bucket: &str, ttl_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer: bearer.to_string(),
            bucket: bucket.to_string(),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> BoardResult<Self> {
        Ok(Self::new(
            config.backend.base_url()?,
            config.backend.api_key()?,
            config.backend.bearer_token()?,
            &config.storage.bucket,
            config.storage.signed_url_ttl_secs,
        ))
    }

    async fn sign(&self, id: &str) -> BoardResult<String> {
        let url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, id
        );
        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
            .json(&serde_json::json!({ "expiresIn": self.ttl_secs }))
            .send()
            .await
            .map_err(|e| BoardError::Connection(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoardError::Remote {
                status: status.as_u16(),
                message: format!("could not sign image {}", id),
            });
        }
        let signed: SignedUrl = response
            .json()
            .await
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        Ok(signed.signed_url)
    }
}

#[async_trait]
impl ImageSource for SignedUrlImageSource {
    async fn fetch_image(&self, id: &str) -> BoardResult<Vec<u8>> {
        let signed = self.sign(id).await?;
        let url = format!("{}/storage/v1{}", self.base_url, signed);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BoardError::Connection(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoardError::Remote {
                status: status.as_u16(),
                message: format!("image {} is not available", id),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BoardError::Connection(e.to_string()))?;
        tracing::debug!("Fetched image {} ({} bytes)", id, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Images kept in a local directory, for offline boards.
#[derive(Debug, Clone)]
pub struct DirectoryImageSource {
    root: PathBuf,
}

impl DirectoryImageSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, id: &str) -> BoardResult<PathBuf> {
        let relative = Path::new(id);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if id.is_empty() || !plain {
            return Err(BoardError::Validation(format!("invalid image id {}", id)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageSource for DirectoryImageSource {
    async fn fetch_image(&self, id: &str) -> BoardResult<Vec<u8>> {
        let path = self.resolve(id)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BoardError::NotFound(format!("image {}", id)),
            _ => BoardError::Io(e),
        })
    }
}
