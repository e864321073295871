//! Embedding-backed candidate retrieval.
//!
//! Generates the triggering API's embedding and finds its nearest stored
//! neighbors. When the store cannot search natively, or the search fails,
//! every stored embedding is ranked locally instead.

use crate::embedding::Embedder;
use crate::models::{ApiEmbedding, ApiRecord};
use crate::similarity::create_embedding_text;
use crate::storage::{EmbeddingStore, rank_by_similarity};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Semantic candidate finder.
pub struct SemanticScorer {
    /// Embedder for generating vectors.
    embedder: Arc<dyn Embedder>,
    /// Store holding previously registered APIs.
    store: Arc<dyn EmbeddingStore>,
    /// Nearest neighbors to fetch.
    top_k: usize,
}

impl SemanticScorer {
    /// Creates a scorer.
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn EmbeddingStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k: top_k.max(1),
        }
    }

    /// Embeds `api`. The returned embedding is empty if the embedder could
    /// not produce a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder fails.
    #[instrument(skip(self, api), fields(operation = "embed_api", api_name = %api.name))]
    pub fn embed_api(&self, api: &ApiRecord) -> Result<ApiEmbedding> {
        let text = create_embedding_text(api);
        let vector = self.embedder.embed(&text)?;
        Ok(ApiEmbedding::from_api(api, vector, text))
    }

    /// Returns up to `top_k` stored embeddings most similar to `query`, with
    /// raw cosine similarity, skipping the entry named `exclude`.
    ///
    /// # Errors
    ///
    /// Returns an error only if both native search and the local fallback
    /// fail.
    #[instrument(skip(self, query), fields(operation = "find_similar", store = self.store.name(), top_k = self.top_k))]
    pub fn find_similar(&self, query: &[f32], exclude: &str) -> Result<Vec<(ApiEmbedding, f32)>> {
        let start = Instant::now();

        let hits = match self.store.search_top_k(query, self.top_k, Some(exclude)) {
            Ok(hits) => hits,
            Err(e) => {
                let reason = if matches!(e, Error::NotImplemented(_)) {
                    "not_implemented"
                } else {
                    "error"
                };
                tracing::debug!(error = %e, reason, "Vector search unavailable, ranking stored embeddings locally");
                metrics::counter!("vector_search_fallback_total", "reason" => reason).increment(1);
                let all = self.store.list_all()?;
                rank_by_similarity(all, query, self.top_k, Some(exclude))
            },
        };

        metrics::histogram!("vector_search_duration_ms", "store" => self.store.name())
            .record(start.elapsed().as_secs_f64() * 1000.0);
        Ok(hits)
    }

    /// Number of stored embeddings other than `exclude`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn candidate_count(&self, exclude: &str) -> Result<usize> {
        let total = self.store.count()?;
        let own = usize::from(self.store.get(exclude)?.is_some());
        Ok(total.saturating_sub(own))
    }

    /// Stores `embedding`, replacing any earlier entry with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn record(&self, embedding: &ApiEmbedding) -> Result<()> {
        self.store.upsert(embedding)
    }

    /// Embeds `apis` in one batch and stores every non-empty result.
    ///
    /// Returns the number of embeddings stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedder or store fails.
    #[instrument(skip(self, apis), fields(operation = "index_apis", count = apis.len()))]
    pub fn index(&self, apis: &[ApiRecord]) -> Result<usize> {
        let texts: Vec<String> = apis.iter().map(create_embedding_text).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&refs)?;

        let mut stored = 0;
        for ((api, text), vector) in apis.iter().zip(texts).zip(vectors) {
            if vector.is_empty() {
                tracing::debug!(api_name = %api.name, "Skipping API with empty embedding");
                continue;
            }
            self.store.upsert(&ApiEmbedding::from_api(api, vector, text))?;
            stored += 1;
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::storage::{InMemoryEmbeddingStore, SqliteEmbeddingStore};

    fn api(name: &str, description: &str) -> ApiRecord {
        ApiRecord::new(name, name).with_description(description)
    }

    #[test]
    fn test_native_and_fallback_agree() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new());
        let memory: Arc<dyn EmbeddingStore> = Arc::new(InMemoryEmbeddingStore::new());
        let sqlite: Arc<dyn EmbeddingStore> = Arc::new(SqliteEmbeddingStore::in_memory().unwrap());

        let corpus = vec![
            api("pets", "manage pets in the store"),
            api("billing", "invoices and payment collection"),
        ];

        let native = SemanticScorer::new(Arc::clone(&embedder), memory, 20);
        let fallback = SemanticScorer::new(embedder, sqlite, 20);
        assert_eq!(native.index(&corpus).unwrap(), 2);
        assert_eq!(fallback.index(&corpus).unwrap(), 2);

        let query = native.embed_api(&api("pets-v2", "manage pets in a store")).unwrap();
        let a = native.find_similar(&query.vector, "pets-v2").unwrap();
        let b = fallback.find_similar(&query.vector, "pets-v2").unwrap();

        assert_eq!(a.len(), 2);
        assert_eq!(a[0].0.api_name, "pets");
        assert_eq!(b[0].0.api_name, "pets");
        assert!((a[0].1 - b[0].1).abs() < 1e-6);
    }

    #[test]
    fn test_candidate_count_excludes_self() {
        let store: Arc<dyn EmbeddingStore> = Arc::new(InMemoryEmbeddingStore::new());
        let scorer = SemanticScorer::new(Arc::new(HashEmbedder::new()), store, 5);
        scorer.index(&[api("a", "x"), api("b", "y")]).unwrap();

        assert_eq!(scorer.candidate_count("a").unwrap(), 1);
        assert_eq!(scorer.candidate_count("zzz").unwrap(), 2);
    }
}
