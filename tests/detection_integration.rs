//! Duplicate detection integration tests.
//!
//! Exercises the full pipeline across catalogs, embedders, stores and
//! notifiers, including the degraded paths:
//! - Structural scoring of a renamed copy of an existing API
//! - Semantic mode with write-after-read of the triggering embedding
//! - Store and embedder failures, including local ranking when search errors
//! - Catalog failures

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use apidedup::catalog::{ApiCatalog, InMemoryCatalog};
use apidedup::embedding::{FallbackEmbedder, HashEmbedder};
use apidedup::notify::{NotificationDispatcher, Notifier};
use apidedup::storage::{InMemoryEmbeddingStore, SqliteEmbeddingStore};
use apidedup::{
    ApiEmbedding, ApiRecord, DetectionConfig, DetectionMode, DetectionReport, DetectionService,
    Embedder, EmbeddingStore, Endpoint, Error, Result, TriggerKind,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Fixtures
// ============================================================================

fn pet_store() -> ApiRecord {
    ApiRecord::new("api-petstore", "PetStore")
        .with_endpoint(Endpoint::new("GET", "/pets").with_summary("List all pets"))
        .with_endpoint(Endpoint::new("POST", "/pets").with_summary("Create a pet"))
        .with_endpoint(Endpoint::new("GET", "/pets/{petId}").with_summary("Info for a specific pet"))
        .with_schema("Pet")
        .with_schema("Error")
}

fn pet_v2() -> ApiRecord {
    ApiRecord::new("api-petv2", "PetV2")
        .with_endpoint(Endpoint::new("GET", "/pets").with_summary("List all pets"))
        .with_endpoint(Endpoint::new("POST", "/pets").with_summary("Create a pet"))
        .with_endpoint(Endpoint::new("GET", "/pets/:id").with_summary("Info for a specific pet"))
        .with_schema("PetDTO")
        .with_schema("Error")
}

fn billing() -> ApiRecord {
    ApiRecord::new("api-billing", "Billing")
        .with_description("Invoices, payments and refunds")
        .with_endpoint(Endpoint::new("GET", "/invoices"))
        .with_endpoint(Endpoint::new("POST", "/payments/{paymentId}/refunds"))
        .with_schema("Invoice")
}

fn config(threshold: f32) -> DetectionConfig {
    DetectionConfig::default().with_threshold(threshold)
}

// ============================================================================
// Test doubles
// ============================================================================

/// Store whose reads always fail.
struct FailingStore;

impl EmbeddingStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn upsert(&self, _embedding: &ApiEmbedding) -> Result<()> {
        Err(Error::operation("upsert", "store offline"))
    }

    fn get(&self, _api_name: &str) -> Result<Option<ApiEmbedding>> {
        Err(Error::operation("get", "store offline"))
    }

    fn list_all(&self) -> Result<Vec<ApiEmbedding>> {
        Err(Error::operation("list_all", "store offline"))
    }

    fn delete(&self, _api_name: &str) -> Result<bool> {
        Err(Error::operation("delete", "store offline"))
    }

    fn count(&self) -> Result<usize> {
        Err(Error::operation("count", "store offline"))
    }
}

/// Store whose top-K search errors while reads succeed.
#[derive(Default)]
struct SearchFailingStore {
    inner: InMemoryEmbeddingStore,
    searches: Mutex<usize>,
}

impl EmbeddingStore for SearchFailingStore {
    fn name(&self) -> &'static str {
        "search-failing"
    }

    fn upsert(&self, embedding: &ApiEmbedding) -> Result<()> {
        self.inner.upsert(embedding)
    }

    fn get(&self, api_name: &str) -> Result<Option<ApiEmbedding>> {
        self.inner.get(api_name)
    }

    fn list_all(&self) -> Result<Vec<ApiEmbedding>> {
        self.inner.list_all()
    }

    fn delete(&self, api_name: &str) -> Result<bool> {
        self.inner.delete(api_name)
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn search_top_k(
        &self,
        _query: &[f32],
        _k: usize,
        _exclude: Option<&str>,
    ) -> Result<Vec<(ApiEmbedding, f32)>> {
        *self.searches.lock().unwrap() += 1;
        Err(Error::operation("search_top_k", "index corrupted"))
    }
}

/// Embedder that always errors.
struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dimensions(&self) -> usize {
        8
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::operation("embed", "provider unreachable"))
    }
}

/// Catalog that cannot be listed.
struct UnreachableCatalog;

impl ApiCatalog for UnreachableCatalog {
    fn list_apis(&self) -> Result<Vec<ApiRecord>> {
        Err(Error::operation("list_apis", "connection refused"))
    }

    fn get_api_by_reference(&self, _reference: &str) -> Result<Option<ApiRecord>> {
        Ok(None)
    }

    fn get_specification_text(
        &self,
        _api_name: &str,
        _version: Option<&str>,
        _definition_name: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Notifier that records the reports it receives.
#[derive(Default)]
struct RecordingNotifier {
    reports: Mutex<Vec<DetectionReport>>,
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn deliver(&self, report: &DetectionReport) -> Result<()> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

// ============================================================================
// Structural mode
// ============================================================================

#[test]
fn test_renamed_copy_flagged_structurally() {
    let catalog = InMemoryCatalog::new(vec![pet_store(), billing()]);
    let service = DetectionService::structural(config(0.5));

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();

    assert_eq!(report.mode, DetectionMode::Structural);
    assert_eq!(report.total_analyzed, 2);
    assert_eq!(report.results.len(), 1);

    let result = &report.results[0];
    assert_eq!(result.existing.name, "PetStore");
    assert!((result.scores.path - 1.0).abs() < 1e-6);
    assert!((result.scores.schema - 1.0).abs() < 1e-6);
    assert!(result.overall_score >= 0.5);
    assert!(result.is_duplicate);
    assert!(!result.used_semantic());
    assert_eq!(result.matched_endpoints.len(), 3);

    let recs = &result.recommendations;
    assert!(recs.iter().any(|r| r == "3 of 3 endpoints match existing endpoints in 'PetStore'."));
    assert!(recs.iter().any(|r| r.starts_with("Data models overlap with 'PetStore'")));
    assert!(recs.last().unwrap().starts_with("Contact the owner of 'PetStore'"));
}

#[test]
fn test_default_threshold_does_not_flag_partial_overlap() {
    let catalog = InMemoryCatalog::new(vec![pet_store()]);
    let service = DetectionService::structural(DetectionConfig::default());

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Manual).unwrap();
    assert_eq!(report.total_analyzed, 1);
    assert!(report.results.is_empty());
}

#[test]
fn test_corpus_of_only_self_is_empty() {
    let api = pet_store();
    let catalog = InMemoryCatalog::new(vec![api.clone()]);
    let service = DetectionService::structural(config(0.0));

    let report = service.detect(&catalog, &api, TriggerKind::Updated).unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.total_analyzed, 0);
}

#[test]
fn test_results_sorted_by_score() {
    let mut near = pet_store();
    near.id = "api-near".into();
    near.name = "PetStoreNext".to_string();
    near.schemas.clear();

    let catalog = InMemoryCatalog::new(vec![pet_store(), near, billing()]);
    let service = DetectionService::structural(config(0.3));

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();
    assert!(report.results.len() >= 2);
    assert!(report
        .results
        .windows(2)
        .all(|pair| pair[0].overall_score >= pair[1].overall_score));
}

#[test]
fn test_catalog_failure_propagates() {
    let service = DetectionService::structural(config(0.5));
    let err = service
        .detect(&UnreachableCatalog, &pet_v2(), TriggerKind::Created)
        .unwrap_err();
    assert!(matches!(err, Error::CatalogUnavailable(_)));
}

// ============================================================================
// Semantic mode
// ============================================================================

#[test]
fn test_semantic_detection_records_trigger() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new());
    let store = Arc::new(InMemoryEmbeddingStore::new());
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(embedder),
        Some(Arc::clone(&store) as Arc<dyn EmbeddingStore>),
    );

    assert_eq!(service.index(&[pet_store(), billing()]).unwrap(), 2);

    // The catalog is not consulted in semantic mode.
    let report = service
        .detect(&UnreachableCatalog, &pet_v2(), TriggerKind::Created)
        .unwrap();

    assert_eq!(report.mode, DetectionMode::Semantic);
    assert_eq!(report.total_analyzed, 2);
    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.existing.name, "PetStore");
    assert!(result.used_semantic());
    assert!(result.scores.semantic.unwrap() >= 0.5);
    assert!((result.scores.path - 1.0).abs() < 1e-6);

    assert_eq!(store.count().unwrap(), 3);
    assert!(store.get("PetV2").unwrap().is_some());
}

#[test]
fn test_semantic_rerun_excludes_own_embedding() {
    let store: Arc<dyn EmbeddingStore> = Arc::new(InMemoryEmbeddingStore::new());
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(Arc::new(HashEmbedder::new())),
        Some(store),
    );
    service.index(&[pet_store()]).unwrap();

    let first = service.detect(&UnreachableCatalog, &pet_v2(), TriggerKind::Created).unwrap();
    let second = service.detect(&UnreachableCatalog, &pet_v2(), TriggerKind::Updated).unwrap();

    assert_eq!(first.total_analyzed, 1);
    assert_eq!(second.total_analyzed, 1);
    assert_eq!(second.results.len(), first.results.len());
    assert!(second.results.iter().all(|r| r.existing.name != "PetV2"));
}

#[test]
fn test_sqlite_store_uses_local_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn EmbeddingStore> =
        Arc::new(SqliteEmbeddingStore::open(dir.path().join("embeddings.db")).unwrap());
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(Arc::new(HashEmbedder::new())),
        Some(Arc::clone(&store)),
    );
    service.index(&[pet_store(), billing()]).unwrap();

    let report = service.detect(&UnreachableCatalog, &pet_v2(), TriggerKind::Created).unwrap();
    assert_eq!(report.mode, DetectionMode::Semantic);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].existing.name, "PetStore");
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn test_search_error_ranks_stored_embeddings_locally() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new());
    let store = Arc::new(SearchFailingStore::default());
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(Arc::clone(&embedder)),
        Some(Arc::clone(&store) as Arc<dyn EmbeddingStore>),
    );
    service.index(&[pet_store(), billing()]).unwrap();

    // A stale entry for the trigger itself and an entry that never embedded.
    let own = ApiEmbedding::from_api(&pet_v2(), embedder.embed("PetV2 pets").unwrap(), "PetV2 pets");
    store.upsert(&own).unwrap();
    let ghost = ApiRecord::new("api-ghost", "Ghost").with_endpoint(Endpoint::new("GET", "/pets"));
    store.upsert(&ApiEmbedding::from_api(&ghost, Vec::new(), "")).unwrap();

    let report = service.detect(&UnreachableCatalog, &pet_v2(), TriggerKind::Created).unwrap();

    assert_eq!(*store.searches.lock().unwrap(), 1);
    assert_eq!(report.mode, DetectionMode::Semantic);
    assert_eq!(report.total_analyzed, 3);
    let names: Vec<&str> = report.results.iter().map(|r| r.existing.name.as_str()).collect();
    assert_eq!(names, vec!["PetStore"]);
    assert!(report.results[0].is_duplicate);
    assert!(report.results[0].scores.semantic.unwrap() >= 0.5);
}

#[test]
fn test_store_failure_yields_empty_semantic_report() {
    let catalog = InMemoryCatalog::new(vec![pet_store()]);
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(Arc::new(HashEmbedder::new())),
        Some(Arc::new(FailingStore)),
    );

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();
    assert_eq!(report.mode, DetectionMode::Semantic);
    assert!(report.results.is_empty());
    assert_eq!(report.total_analyzed, 0);
}

#[test]
fn test_embedder_failure_yields_empty_semantic_report() {
    let catalog = InMemoryCatalog::new(vec![pet_store()]);
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(Arc::new(FailingEmbedder)),
        Some(Arc::new(InMemoryEmbeddingStore::new())),
    );

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();
    assert_eq!(report.mode, DetectionMode::Semantic);
    assert!(report.results.is_empty());
}

#[test]
fn test_empty_embedding_falls_back_to_structural() {
    let catalog = InMemoryCatalog::new(vec![pet_store()]);
    let service = DetectionService::new(
        config(0.5).with_semantic_enabled(true),
        Some(Arc::new(FallbackEmbedder::new())),
        Some(Arc::new(InMemoryEmbeddingStore::new())),
    );

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();
    assert_eq!(report.mode, DetectionMode::Structural);
    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_semantic_flag_off_ignores_collaborators() {
    let catalog = InMemoryCatalog::new(vec![pet_store()]);
    let service = DetectionService::new(
        config(0.5),
        Some(Arc::new(FailingEmbedder)),
        Some(Arc::new(FailingStore)),
    );

    assert!(!service.semantic_available());
    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();
    assert_eq!(report.mode, DetectionMode::Structural);
    assert_eq!(report.results.len(), 1);
}

// ============================================================================
// Notifications
// ============================================================================

#[test]
fn test_reports_dispatched_to_notifiers() {
    let catalog = InMemoryCatalog::new(vec![pet_store(), billing()]);
    let service = DetectionService::structural(config(0.5));
    let recorder = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::new().with_notifier(Arc::clone(&recorder) as Arc<dyn Notifier>);

    let report = service.detect(&catalog, &pet_v2(), TriggerKind::Created).unwrap();
    let summary = dispatcher.dispatch(&report);
    assert_eq!(summary.delivered, 1);

    let clean = service.detect(&catalog, &billing(), TriggerKind::Created).unwrap();
    assert!(clean.results.is_empty());
    assert!(dispatcher.dispatch(&clean).skipped);

    let received = recorder.reports.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].api.name, "PetV2");
}
