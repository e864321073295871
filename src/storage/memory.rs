//! In-memory embedding store.

use super::rank_by_similarity;
use super::sqlite::acquire_lock;
use super::traits::EmbeddingStore;
use crate::models::ApiEmbedding;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::instrument;

/// Embedding store held in process memory.
///
/// Answers top-K queries by ranking the map under its lock, which is linear
/// in the number of entries. Intended for tests, one-shot CLI runs and small
/// catalogs.
#[derive(Debug, Default)]
pub struct InMemoryEmbeddingStore {
    entries: Mutex<HashMap<String, ApiEmbedding>>,
    /// Required vector length, when fixed.
    dimensions: Option<usize>,
}

impl InMemoryEmbeddingStore {
    /// Creates an empty store accepting any vector length.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects vectors of any other length.
    #[must_use]
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            dimensions: Some(dimensions),
        }
    }
}

impl EmbeddingStore for InMemoryEmbeddingStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip(self, embedding), fields(operation = "upsert", store = "memory", api_name = %embedding.api_name))]
    fn upsert(&self, embedding: &ApiEmbedding) -> Result<()> {
        if let Some(expected) = self.dimensions {
            if embedding.dimensions() != expected {
                return Err(Error::InvalidInput(format!(
                    "Embedding dimension mismatch: expected {expected}, got {}",
                    embedding.dimensions()
                )));
            }
        }

        acquire_lock(&self.entries).insert(embedding.api_name.clone(), embedding.clone());
        Ok(())
    }

    fn get(&self, api_name: &str) -> Result<Option<ApiEmbedding>> {
        Ok(acquire_lock(&self.entries).get(api_name).cloned())
    }

    fn list_all(&self) -> Result<Vec<ApiEmbedding>> {
        let mut all: Vec<ApiEmbedding> = acquire_lock(&self.entries).values().cloned().collect();
        all.sort_by(|a, b| a.api_name.cmp(&b.api_name));
        Ok(all)
    }

    fn delete(&self, api_name: &str) -> Result<bool> {
        Ok(acquire_lock(&self.entries).remove(api_name).is_some())
    }

    fn count(&self) -> Result<usize> {
        Ok(acquire_lock(&self.entries).len())
    }

    #[instrument(skip(self, query), fields(operation = "search_top_k", store = "memory", k = k))]
    fn search_top_k(
        &self,
        query: &[f32],
        k: usize,
        exclude: Option<&str>,
    ) -> Result<Vec<(ApiEmbedding, f32)>> {
        let entries = acquire_lock(&self.entries);
        Ok(rank_by_similarity(entries.values(), query, k, exclude)
            .into_iter()
            .map(|(embedding, score)| (embedding.clone(), score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiRecord;
    use std::sync::Arc;
    use std::thread;

    fn embedding(name: &str, vector: Vec<f32>) -> ApiEmbedding {
        ApiEmbedding::from_api(&ApiRecord::new(name, name), vector, name)
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let store = InMemoryEmbeddingStore::new();
        store.upsert(&embedding("pets", vec![1.0, 0.0])).unwrap();
        store.upsert(&embedding("pets", vec![0.0, 1.0])).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let stored = store.get("pets").unwrap().unwrap();
        assert_eq!(stored.vector, vec![0.0, 1.0]);
    }

    #[test]
    fn test_delete() {
        let store = InMemoryEmbeddingStore::new();
        store.upsert(&embedding("pets", vec![1.0])).unwrap();
        assert!(store.delete("pets").unwrap());
        assert!(!store.delete("pets").unwrap());
        assert!(store.get("pets").unwrap().is_none());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let store = InMemoryEmbeddingStore::with_dimensions(3);
        let err = store.upsert(&embedding("pets", vec![1.0])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_search_excludes_self() {
        let store = InMemoryEmbeddingStore::new();
        store.upsert(&embedding("self", vec![1.0, 0.0])).unwrap();
        store.upsert(&embedding("other", vec![0.8, 0.2])).unwrap();

        let hits = store.search_top_k(&[1.0, 0.0], 20, Some("self")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.api_name, "other");
    }

    #[test]
    fn test_concurrent_upserts() {
        let store = Arc::new(InMemoryEmbeddingStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .upsert(&embedding(&format!("api-{i}"), vec![1.0]))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.count().unwrap(), 8);
    }
}
