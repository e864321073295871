//! Embedding store trait.
//!
//! Persists one [`ApiEmbedding`] per API name and optionally answers
//! nearest-neighbor queries.
//!
//! # Available Implementations
//!
//! | Store | Native search | Persistence |
//! |-------|---------------|-------------|
//! | `InMemoryEmbeddingStore` | yes | process lifetime |
//! | `SqliteEmbeddingStore` | no | `SQLite` file |
//!
//! Stores without native search return [`Error::NotImplemented`] from
//! [`EmbeddingStore::search_top_k`]; detection then ranks
//! [`EmbeddingStore::list_all`] locally.

use crate::models::ApiEmbedding;
use crate::{Error, Result};

/// Trait for embedding stores.
///
/// Implementations use interior mutability so one store can be shared
/// through `Arc` by concurrent detection runs. Upserts are
/// last-writer-wins keyed by API name.
pub trait EmbeddingStore: Send + Sync {
    /// Returns a short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Inserts or replaces the embedding for `embedding.api_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or the dimensions are rejected.
    fn upsert(&self, embedding: &ApiEmbedding) -> Result<()>;

    /// Returns the embedding stored for `api_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, api_name: &str) -> Result<Option<ApiEmbedding>>;

    /// Returns every stored embedding.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_all(&self) -> Result<Vec<ApiEmbedding>>;

    /// Removes the embedding for `api_name`. Returns true if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete(&self, api_name: &str) -> Result<bool>;

    /// Number of stored embeddings.
    ///
    /// # Errors
    ///
    /// Returns an error if the count fails.
    fn count(&self) -> Result<usize>;

    /// Returns up to `k` embeddings most similar to `query`, as raw cosine
    /// similarity, highest first. The entry named `exclude` is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] by default.
    fn search_top_k(
        &self,
        query: &[f32],
        k: usize,
        exclude: Option<&str>,
    ) -> Result<Vec<(ApiEmbedding, f32)>> {
        let _ = (query, k, exclude);
        Err(Error::NotImplemented(format!(
            "{} store has no native vector search",
            self.name()
        )))
    }
}
