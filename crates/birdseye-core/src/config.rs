use crate::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_BUCKET: &str = "item-images";
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300;
const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

/// Connection settings for the hosted relational backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    /// Session token of a signed-in user. Falls back to the anon key.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_ttl")]
    pub signed_url_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Columns created when a fresh local board file is initialised.
    #[serde(default = "default_columns")]
    pub default_columns: Vec<String>,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_ttl() -> u64 {
    DEFAULT_SIGNED_URL_TTL_SECS
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_columns() -> Vec<String> {
    ["Backlog", "In Progress", "Review", "Done"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            signed_url_ttl_secs: default_ttl(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_columns: default_columns(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/birdseye/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("birdseye/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("birdseye\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Loads the user config, falling back to defaults when the file is
    /// missing or unreadable, then applies environment overrides.
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| match Self::load_from(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> BoardResult<Self> {
        toml::from_str(content).map_err(|e| BoardError::Validation(e.to_string()))
    }

    /// Applies `BIRDSEYE_*` overrides through the given lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BIRDSEYE_URL") {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup("BIRDSEYE_ANON_KEY") {
            self.backend.anon_key = Some(key);
        }
        if let Some(token) = lookup("BIRDSEYE_ACCESS_TOKEN") {
            self.backend.access_token = Some(token);
        }
    }
}

impl BackendConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> BoardResult<&str> {
        self.url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                BoardError::Validation(
                    "backend url is not configured (set BIRDSEYE_URL or [backend] url)".into(),
                )
            })
    }

    pub fn api_key(&self) -> BoardResult<&str> {
        self.anon_key.as_deref().ok_or_else(|| {
            BoardError::Validation(
                "backend anon key is not configured (set BIRDSEYE_ANON_KEY)".into(),
            )
        })
    }

    /// Token for the `Authorization` header.
    pub fn bearer_token(&self) -> BoardResult<&str> {
        match self.access_token.as_deref() {
            Some(token) => Ok(token),
            None => self.api_key(),
        }
    }
}
