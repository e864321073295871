//! Duplicate detection orchestrator.
//!
//! Runs one triggering API against the catalog in one of two modes:
//!
//! 1. **Semantic**: embed the API, fetch its nearest stored neighbors, keep
//!    those whose similarity reaches the threshold, score each structurally
//!    and fuse with the semantic weights, then store the API's own embedding.
//!    Every kept neighbor is reported as a duplicate.
//! 2. **Structural**: score every catalog API except the trigger itself.
//!
//! Semantic mode is used when it is enabled and both an embedder and an
//! embedding store are present. A zero-length embedding switches that run to
//! structural mode.

use super::config::DetectionConfig;
use super::semantic::SemanticScorer;
use crate::catalog::ApiCatalog;
use crate::embedding::Embedder;
use crate::models::{ApiRecord, ComparisonResult, DetectionMode, DetectionReport, TriggerKind};
use crate::similarity::{
    compare_semantic, compare_structural, cosine_similarity, semantic_component,
};
use crate::storage::EmbeddingStore;
use crate::{Error, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Service for duplicate detection.
///
/// # Example
///
/// ```rust
/// use apidedup::catalog::InMemoryCatalog;
/// use apidedup::models::{ApiRecord, Endpoint, TriggerKind};
/// use apidedup::services::{DetectionConfig, DetectionService};
///
/// let existing = ApiRecord::new("pets", "PetStore")
///     .with_endpoint(Endpoint::new("GET", "/pets/{id}"))
///     .with_schema("PetDTO");
/// let catalog = InMemoryCatalog::new(vec![existing]);
///
/// let new_api = ApiRecord::new("pets-v2", "PetV2")
///     .with_endpoint(Endpoint::new("GET", "/pets/:petId"))
///     .with_schema("Pet");
///
/// let service = DetectionService::structural(DetectionConfig::default().with_threshold(0.5));
/// let report = service.detect(&catalog, &new_api, TriggerKind::Created)?;
/// assert_eq!(report.results.len(), 1);
/// assert_eq!(report.total_analyzed, 1);
/// # Ok::<(), apidedup::Error>(())
/// ```
pub struct DetectionService {
    /// Configuration.
    config: DetectionConfig,
    /// Embedder for semantic mode.
    embedder: Option<Arc<dyn Embedder>>,
    /// Embedding store for semantic mode.
    store: Option<Arc<dyn EmbeddingStore>>,
}

impl DetectionService {
    /// Creates a service with optional semantic collaborators.
    #[must_use]
    pub fn new(
        config: DetectionConfig,
        embedder: Option<Arc<dyn Embedder>>,
        store: Option<Arc<dyn EmbeddingStore>>,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
        }
    }

    /// Creates a service without semantic collaborators.
    #[must_use]
    pub const fn structural(config: DetectionConfig) -> Self {
        Self {
            config,
            embedder: None,
            store: None,
        }
    }

    /// Sets the embedder.
    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Sets the embedding store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn EmbeddingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Returns a semantic scorer when semantic mode is enabled and both
    /// collaborators are present. Evaluated on every call.
    fn semantic_scorer(&self) -> Option<SemanticScorer> {
        if !self.config.semantic_enabled {
            return None;
        }
        match (&self.embedder, &self.store) {
            (Some(embedder), Some(store)) => Some(SemanticScorer::new(
                Arc::clone(embedder),
                Arc::clone(store),
                self.config.top_k,
            )),
            _ => None,
        }
    }

    /// Returns true if the next run would attempt semantic mode.
    #[must_use]
    pub fn semantic_available(&self) -> bool {
        self.semantic_scorer().is_some()
    }

    /// Detects duplicates of `api` in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogUnavailable`] if a structural run cannot fetch
    /// the corpus. Embedding and store failures never fail the run.
    #[instrument(
        skip(self, catalog, api),
        fields(
            operation = "detect",
            api_name = %api.name,
            trigger = %trigger,
            threshold = self.config.similarity_threshold
        )
    )]
    pub fn detect(
        &self,
        catalog: &dyn ApiCatalog,
        api: &ApiRecord,
        trigger: TriggerKind,
    ) -> Result<DetectionReport> {
        let start = Instant::now();

        let semantic = self
            .semantic_scorer()
            .and_then(|scorer| self.detect_semantic(&scorer, api, trigger));

        let report = match semantic {
            Some(report) => report,
            None => {
                let corpus = catalog.list_apis().map_err(|e| match e {
                    Error::CatalogUnavailable(_) => e,
                    other => Error::CatalogUnavailable(other.to_string()),
                })?;
                self.detect_against(api, &corpus, trigger)
            },
        };

        Self::record_metrics(&report, start);
        Ok(report)
    }

    /// Runs semantic mode. `None` means the embedding was empty and the run
    /// should continue structurally.
    fn detect_semantic(
        &self,
        scorer: &SemanticScorer,
        api: &ApiRecord,
        trigger: TriggerKind,
    ) -> Option<DetectionReport> {
        let threshold = self.config.similarity_threshold;

        let embedding = match scorer.embed_api(api) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "Embedding failed, no semantic results this run");
                return Some(self.report(api, trigger, Vec::new(), 0, DetectionMode::Semantic));
            },
        };

        if embedding.is_empty() {
            tracing::debug!("Empty embedding, falling back to structural detection");
            return None;
        }

        let hits = match scorer.find_similar(&embedding.vector, &api.name) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "Embedding store unavailable, no semantic results this run");
                return Some(self.report(api, trigger, Vec::new(), 0, DetectionMode::Semantic));
            },
        };

        let total_analyzed = scorer.candidate_count(&api.name).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Could not count stored embeddings");
            hits.len()
        });

        let mut results = Vec::new();
        for (stored, raw_cosine) in hits {
            if stored.api_id == api.id || semantic_component(raw_cosine) < threshold {
                continue;
            }
            // Hits past the similarity filter are flagged regardless of the fused score.
            let existing = stored.to_api_record();
            results.push(compare_semantic(api, &existing, raw_cosine, 0.0));
        }

        if let Err(e) = scorer.record(&embedding) {
            tracing::warn!(error = %e, "Failed to store embedding for triggering API");
        }

        Some(self.report(api, trigger, results, total_analyzed, DetectionMode::Semantic))
    }

    /// Structural detection against an explicit corpus.
    ///
    /// Candidates with the same id or name as `api` are skipped and not
    /// counted.
    #[must_use]
    pub fn detect_against(
        &self,
        api: &ApiRecord,
        corpus: &[ApiRecord],
        trigger: TriggerKind,
    ) -> DetectionReport {
        let threshold = self.config.similarity_threshold;
        let mut analyzed = 0;
        let mut results = Vec::new();

        for candidate in corpus.iter().filter(|c| !api.is_same_api(c)) {
            analyzed += 1;
            let result = compare_structural(api, candidate, threshold);
            if result.is_duplicate {
                results.push(result);
            }
        }

        self.report(api, trigger, results, analyzed, DetectionMode::Structural)
    }

    /// Compares two records directly.
    ///
    /// Uses semantic fusion when semantic mode is available and both records
    /// embed to non-empty vectors; otherwise structural.
    #[must_use]
    pub fn compare(&self, new_api: &ApiRecord, existing: &ApiRecord) -> ComparisonResult {
        let threshold = self.config.similarity_threshold;

        if let Some(scorer) = self.semantic_scorer() {
            match (scorer.embed_api(new_api), scorer.embed_api(existing)) {
                (Ok(a), Ok(b)) if !a.is_empty() && !b.is_empty() => {
                    let raw = cosine_similarity(&a.vector, &b.vector);
                    return compare_semantic(new_api, existing, raw, threshold);
                },
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(error = %e, "Embedding failed, comparing structurally");
                },
                _ => {},
            }
        }

        compare_structural(new_api, existing, threshold)
    }

    /// Embeds every API in `apis` and stores the embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no embedder or store is configured,
    /// or the embedder/store error.
    pub fn index(&self, apis: &[ApiRecord]) -> Result<usize> {
        match (&self.embedder, &self.store) {
            (Some(embedder), Some(store)) => {
                SemanticScorer::new(Arc::clone(embedder), Arc::clone(store), self.config.top_k)
                    .index(apis)
            },
            _ => Err(Error::InvalidInput(
                "indexing requires an embedding provider and an embedding store".to_string(),
            )),
        }
    }

    fn report(
        &self,
        api: &ApiRecord,
        trigger: TriggerKind,
        mut results: Vec<ComparisonResult>,
        total_analyzed: usize,
        mode: DetectionMode,
    ) -> DetectionReport {
        results.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        DetectionReport {
            api: api.clone(),
            trigger,
            results,
            total_analyzed,
            threshold: self.config.similarity_threshold,
            mode,
            generated_at: Utc::now(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn record_metrics(report: &DetectionReport, start: Instant) {
        let mode = report.mode.as_str();
        metrics::counter!("detection_runs_total", "mode" => mode).increment(1);
        metrics::counter!("detection_duplicates_total", "mode" => mode)
            .increment(report.results.len() as u64);
        metrics::histogram!("detection_duration_ms", "mode" => mode)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        tracing::info!(
            mode,
            total_analyzed = report.total_analyzed,
            duplicates = report.results.len(),
            duration_ms = start.elapsed().as_millis(),
            "Detection complete"
        );
    }
}
