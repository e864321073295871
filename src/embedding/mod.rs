//! Embedding generation.
//!
//! Provides remote embeddings over an OpenAI-compatible API, deterministic
//! hash-based pseudo-embeddings for offline use, and a fallback that disables
//! semantic scoring.

mod fallback;
mod hash;
mod openai;

pub use fallback::FallbackEmbedder;
pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

use crate::Result;

/// Trait for embedding generators.
///
/// An empty vector means the text could not be embedded; callers treat it as
/// "semantic scoring unavailable" rather than an error.
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensions, or 0 when unknown.
    fn dimensions(&self) -> usize;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
