//! Configuration management.
//!
//! Configuration is layered: defaults, then a TOML file, then environment
//! variables (a `.env` file in the working directory is loaded first).
//!
//! ```toml
//! [detection]
//! similarity_threshold = 0.75
//! semantic_enabled = true
//! top_k = 20
//!
//! [catalog]
//! dir = "./catalog"
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//!
//! [store]
//! backend = "sqlite"
//! path = "~/.local/share/apidedup/embeddings.db"
//!
//! [logging]
//! format = "json"
//!
//! [alerts]
//! min_score = 0.8
//! ```

use crate::notify::{AlertConfig, WebhookEndpoint, validate_webhooks};
use crate::observability::LoggingConfig;
use crate::services::DetectionConfig;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application name used for config and data directories.
pub const APP_NAME: &str = "apidedup";

/// Embedding provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingProvider {
    /// No embeddings; detection is structural.
    #[default]
    None,
    /// Deterministic local hash embeddings.
    Hash,
    /// OpenAI-compatible HTTP endpoint.
    OpenAi,
}

impl EmbeddingProvider {
    /// Returns the provider as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hash => "hash",
            Self::OpenAi => "openai",
        }
    }
}

impl FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "" => Ok(Self::None),
            "hash" | "local" => Ok(Self::Hash),
            "openai" | "azure" => Ok(Self::OpenAi),
            other => Err(Error::InvalidInput(format!(
                "unknown embedding provider: {other}"
            ))),
        }
    }
}

/// Embedding store selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process-local map.
    #[default]
    Memory,
    /// `SQLite` file.
    Sqlite,
}

impl StoreBackend {
    /// Returns the backend as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::InvalidInput(format!("unknown store backend: {other}"))),
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingSettings {
    /// Provider.
    pub provider: EmbeddingProvider,
    /// Model name override.
    pub model: Option<String>,
    /// Base URL override.
    pub endpoint: Option<String>,
    /// API key.
    pub api_key: Option<SecretString>,
    /// Vector dimensions override.
    pub dimensions: Option<usize>,
    /// Use the Azure `api-key` header.
    pub azure: bool,
    /// Texts per request.
    pub batch_size: Option<usize>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Embedding store configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreSettings {
    /// Backend.
    pub backend: StoreBackend,
    /// Database path for the `SQLite` backend.
    pub path: Option<PathBuf>,
}

impl StoreSettings {
    /// Database path, defaulting to the platform data directory.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_store_path)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Detection settings.
    pub detection: DetectionConfig,
    /// Catalog directory.
    pub catalog_dir: Option<PathBuf>,
    /// Embedding provider.
    pub embedding: EmbeddingSettings,
    /// Embedding store.
    pub store: StoreSettings,
    /// Logging.
    pub logging: LoggingConfig,
    /// Webhook endpoints.
    pub webhooks: Vec<WebhookEndpoint>,
    /// Log alerts.
    pub alerts: AlertConfig,
    /// File the configuration was loaded from.
    pub source: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Detection section.
    pub detection: Option<ConfigFileDetection>,
    /// Catalog section.
    pub catalog: Option<ConfigFileCatalog>,
    /// Embedding section.
    pub embedding: Option<ConfigFileEmbedding>,
    /// Store section.
    pub store: Option<ConfigFileStore>,
    /// Logging section.
    pub logging: Option<LoggingConfig>,
    /// Webhooks.
    #[serde(default)]
    pub webhooks: Vec<WebhookEndpoint>,
    /// Alerts section.
    pub alerts: Option<AlertConfig>,
}

/// Detection section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileDetection {
    /// Similarity threshold.
    pub similarity_threshold: Option<f32>,
    /// Semantic mode.
    pub semantic_enabled: Option<bool>,
    /// Search breadth.
    pub top_k: Option<usize>,
}

/// Catalog section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCatalog {
    /// Catalog directory.
    pub dir: Option<String>,
}

/// Embedding section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileEmbedding {
    /// Provider name.
    pub provider: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Base URL.
    pub endpoint: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Vector dimensions.
    pub dimensions: Option<usize>,
    /// Azure header mode.
    pub azure: Option<bool>,
    /// Batch size.
    pub batch_size: Option<usize>,
    /// Timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Store section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileStore {
    /// Backend name.
    pub backend: Option<String>,
    /// Database path.
    pub path: Option<String>,
}

impl AppConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_config_file", format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml(&contents)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::operation("parse_config_file", e))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks, in order:
    /// 1. `APIDEDUP_CONFIG_PATH`
    /// 2. Platform config dir (`~/Library/Application Support/apidedup/` on macOS)
    /// 3. XDG-style `~/.config/apidedup/`
    ///
    /// Returns default configuration if no file is found. A file that exists
    /// but cannot be loaded is logged and skipped.
    #[must_use]
    pub fn load_default() -> Self {
        for path in default_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
                },
            }
        }
        Self::default()
    }

    /// Loads configuration the way the CLI does: `explicit` path or the
    /// default locations, then `.env`, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.detection = self.detection.with_env_overrides();
        self.logging = self.logging.with_env_overrides();

        if let Some(dir) = env_non_empty("APIDEDUP_CATALOG_DIR") {
            self.catalog_dir = Some(PathBuf::from(dir));
        }

        if let Some(provider) = env_non_empty("APIDEDUP_EMBEDDING_PROVIDER") {
            match provider.parse() {
                Ok(provider) => self.embedding.provider = provider,
                Err(e) => tracing::warn!(error = %e, "Ignoring APIDEDUP_EMBEDDING_PROVIDER"),
            }
        }

        if let Some(key) =
            env_non_empty("APIDEDUP_EMBEDDING_API_KEY").or_else(|| env_non_empty("OPENAI_API_KEY"))
        {
            self.embedding.api_key = Some(SecretString::from(key));
        }

        if let Some(backend) = env_non_empty("APIDEDUP_STORE") {
            match backend.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => tracing::warn!(error = %e, "Ignoring APIDEDUP_STORE"),
            }
        }

        if let Some(path) = env_non_empty("APIDEDUP_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }

        self
    }

    /// Sets the catalog directory.
    #[must_use]
    pub fn with_catalog_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.catalog_dir = Some(dir.into());
        self
    }

    /// Catalog directory, defaulting to `./catalog`.
    #[must_use]
    pub fn resolved_catalog_dir(&self) -> PathBuf {
        self.catalog_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("catalog"))
    }

    /// Converts a `ConfigFile` to `AppConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(detection) = file.detection {
            if let Some(threshold) = detection.similarity_threshold {
                config.detection = config.detection.with_threshold(threshold);
            }
            if let Some(enabled) = detection.semantic_enabled {
                config.detection = config.detection.with_semantic_enabled(enabled);
            }
            if let Some(top_k) = detection.top_k {
                config.detection = config.detection.with_top_k(top_k);
            }
        }

        if let Some(dir) = file.catalog.and_then(|c| c.dir) {
            config.catalog_dir = Some(expand_home(&dir));
        }

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                config.embedding.provider = provider.parse()?;
            }
            config.embedding.model = embedding.model;
            config.embedding.endpoint = embedding.endpoint;
            config.embedding.api_key = embedding.api_key.map(SecretString::from);
            config.embedding.dimensions = embedding.dimensions;
            config.embedding.azure = embedding.azure.unwrap_or(false);
            config.embedding.batch_size = embedding.batch_size;
            config.embedding.timeout_secs = embedding.timeout_secs;
        }

        if let Some(store) = file.store {
            if let Some(backend) = store.backend {
                config.store.backend = backend.parse()?;
            }
            config.store.path = store.path.as_deref().map(expand_home);
        }

        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        validate_webhooks(&file.webhooks)?;
        config.webhooks = file.webhooks;

        if let Some(alerts) = file.alerts {
            config.alerts = alerts;
        }

        Ok(config)
    }
}

impl fmt::Display for AppConfig {
    /// Renders the effective configuration as TOML with secrets redacted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "***REDACTED***";
        let mut out = String::new();

        if let Some(source) = &self.source {
            let _ = writeln!(out, "# loaded from {}", source.display());
        }

        let _ = writeln!(out, "[detection]");
        let _ = writeln!(out, "similarity_threshold = {}", self.detection.similarity_threshold);
        let _ = writeln!(out, "semantic_enabled = {}", self.detection.semantic_enabled);
        let _ = writeln!(out, "top_k = {}", self.detection.top_k);

        let _ = writeln!(out, "\n[catalog]");
        let _ = writeln!(out, "dir = {:?}", self.resolved_catalog_dir().display().to_string());

        let _ = writeln!(out, "\n[embedding]");
        let _ = writeln!(out, "provider = {:?}", self.embedding.provider.as_str());
        if let Some(model) = &self.embedding.model {
            let _ = writeln!(out, "model = {model:?}");
        }
        if let Some(endpoint) = &self.embedding.endpoint {
            let _ = writeln!(out, "endpoint = {endpoint:?}");
        }
        if self.embedding.api_key.is_some() {
            let _ = writeln!(out, "api_key = {REDACTED:?}");
        }
        if let Some(dimensions) = self.embedding.dimensions {
            let _ = writeln!(out, "dimensions = {dimensions}");
        }
        if self.embedding.azure {
            let _ = writeln!(out, "azure = true");
        }

        let _ = writeln!(out, "\n[store]");
        let _ = writeln!(out, "backend = {:?}", self.store.backend.as_str());
        if self.store.backend == StoreBackend::Sqlite {
            let _ = writeln!(out, "path = {:?}", self.store.resolved_path().display().to_string());
        }

        let _ = writeln!(out, "\n[logging]");
        let _ = writeln!(out, "format = {:?}", self.logging.format.to_string());
        let _ = writeln!(out, "filter = {:?}", self.logging.filter);

        let _ = writeln!(out, "\n[alerts]");
        let _ = writeln!(out, "enabled = {}", self.alerts.enabled);
        let _ = writeln!(out, "min_score = {}", self.alerts.min_score);
        let _ = writeln!(out, "notify_when_empty = {}", self.alerts.notify_when_empty);

        for webhook in &self.webhooks {
            let _ = writeln!(out, "\n[[webhooks]]");
            let _ = writeln!(out, "name = {:?}", webhook.name);
            let _ = writeln!(out, "url = {:?}", webhook.url);
            let _ = writeln!(out, "enabled = {}", webhook.enabled);
            let auth = if webhook.auth.bearer_token().is_some() || webhook.auth.hmac_secret().is_some() {
                REDACTED
            } else {
                "none"
            };
            let _ = writeln!(out, "auth = {auth:?}");
        }

        f.write_str(out.trim_end())
    }
}

/// Candidate config file locations, most specific first.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = env_non_empty("APIDEDUP_CONFIG_PATH") {
        paths.push(PathBuf::from(path));
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        paths.push(base_dirs.config_dir().join(APP_NAME).join("config.toml"));
        paths.push(
            base_dirs
                .home_dir()
                .join(".config")
                .join(APP_NAME)
                .join("config.toml"),
        );
    }

    paths
}

/// Default `SQLite` path under the platform data directory.
fn default_store_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".apidedup").join("embeddings.db"),
        |dirs| dirs.data_dir().join(APP_NAME).join("embeddings.db"),
    )
}

/// Expands a leading `~/`.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = directories::BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
