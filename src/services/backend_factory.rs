//! Backend factory for wiring collaborators from configuration.
//!
//! ```text
//! BackendFactory
//!   ├── create_embedder()   → Option<Arc<dyn Embedder>>
//!   ├── create_store()      → Option<Arc<dyn EmbeddingStore>>
//!   ├── create_service()    → DetectionService
//!   └── create_dispatcher() → NotificationDispatcher
//! ```
//!
//! # Graceful Degradation
//!
//! Factory methods return `Option` for backends that may fail to initialize.
//! Detection then runs structurally instead of failing.

use super::DetectionService;
use crate::config::{AppConfig, EmbeddingProvider, EmbeddingSettings, StoreBackend, StoreSettings};
use crate::embedding::{Embedder, HashEmbedder, OpenAiEmbedder};
use crate::notify::{LogNotifier, NotificationDispatcher, WebhookNotifier};
use crate::storage::{EmbeddingStore, InMemoryEmbeddingStore, SqliteEmbeddingStore};
use std::sync::Arc;
use std::time::Duration;

/// Collaborators built from configuration.
#[derive(Default)]
pub struct BackendSet {
    /// Embedder for generating vectors.
    pub embedder: Option<Arc<dyn Embedder>>,
    /// Store for API embeddings.
    pub store: Option<Arc<dyn EmbeddingStore>>,
}

impl BackendSet {
    /// Returns true if both semantic collaborators are available.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.embedder.is_some() && self.store.is_some()
    }
}

/// Factory for creating collaborators.
pub struct BackendFactory;

impl BackendFactory {
    /// Creates the embedder and store.
    ///
    /// No store is opened when no embedder is configured.
    #[must_use]
    pub fn create_all(config: &AppConfig) -> BackendSet {
        let embedder = Self::create_embedder(&config.embedding);
        let store = embedder
            .as_ref()
            .and_then(|embedder| Self::create_store(&config.store, embedder.dimensions()));
        BackendSet { embedder, store }
    }

    /// Creates the configured embedder, or `None` for the `none` provider.
    #[must_use]
    pub fn create_embedder(settings: &EmbeddingSettings) -> Option<Arc<dyn Embedder>> {
        match settings.provider {
            EmbeddingProvider::None => None,
            EmbeddingProvider::Hash => {
                let embedder = settings
                    .dimensions
                    .map_or_else(HashEmbedder::new, HashEmbedder::with_dimensions);
                tracing::debug!(dimensions = embedder.dimensions(), "Created hash embedder");
                Some(Arc::new(embedder))
            },
            EmbeddingProvider::OpenAi => {
                let mut embedder = OpenAiEmbedder::new().with_azure(settings.azure);
                if let Some(key) = &settings.api_key {
                    embedder = embedder.with_api_key(key.clone());
                }
                if let Some(endpoint) = &settings.endpoint {
                    embedder = embedder.with_endpoint(endpoint);
                }
                if let Some(model) = &settings.model {
                    embedder = embedder.with_model(model);
                }
                if let Some(dimensions) = settings.dimensions {
                    embedder = embedder.with_dimensions(dimensions);
                }
                if let Some(batch_size) = settings.batch_size {
                    embedder = embedder.with_batch_size(batch_size);
                }
                if let Some(timeout) = settings.timeout_secs {
                    embedder = embedder.with_timeout(Duration::from_secs(timeout));
                }
                tracing::debug!(dimensions = embedder.dimensions(), "Created OpenAI-compatible embedder");
                Some(Arc::new(embedder))
            },
        }
    }

    /// Creates the configured store.
    ///
    /// Returns `None` if the `SQLite` database cannot be opened.
    #[must_use]
    pub fn create_store(settings: &StoreSettings, dimensions: usize) -> Option<Arc<dyn EmbeddingStore>> {
        match settings.backend {
            StoreBackend::Memory => Some(Arc::new(InMemoryEmbeddingStore::with_dimensions(dimensions))),
            StoreBackend::Sqlite => {
                let path = settings.resolved_path();
                match SqliteEmbeddingStore::open(&path) {
                    Ok(store) => {
                        tracing::debug!(path = %path.display(), "Opened SQLite embedding store");
                        Some(Arc::new(store))
                    },
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to open SQLite embedding store, semantic detection disabled"
                        );
                        None
                    },
                }
            },
        }
    }

    /// Creates a detection service with whatever collaborators are available.
    #[must_use]
    pub fn create_service(config: &AppConfig) -> DetectionService {
        let backends = Self::create_all(config);
        if config.detection.semantic_enabled && !backends.is_complete() {
            tracing::info!("Semantic detection requested but no embedder is available, using structural mode");
        }
        DetectionService::new(config.detection, backends.embedder, backends.store)
    }

    /// Creates the notification dispatcher.
    #[must_use]
    pub fn create_dispatcher(config: &AppConfig) -> NotificationDispatcher {
        let mut dispatcher =
            NotificationDispatcher::new().with_notify_when_empty(config.alerts.notify_when_empty);

        if config.alerts.enabled {
            dispatcher = dispatcher
                .with_notifier(Arc::new(LogNotifier::new().with_min_score(config.alerts.min_score)));
        }
        if config.webhooks.iter().any(|w| w.enabled) {
            dispatcher = dispatcher.with_notifier(Arc::new(WebhookNotifier::new(config.webhooks.clone())));
        }
        dispatcher
    }
}
