//! Deterministic hash-based pseudo-embeddings.
//!
//! Each normalized word is hashed and spread over a fixed number of
//! dimensions, so texts sharing vocabulary end up close in cosine space.
//! Useful offline and in tests; not a substitute for a trained model.

use super::Embedder;
use crate::Result;
use crate::similarity::words;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Bound on words considered per text.
const MAX_WORDS: usize = 1000;

/// Hash-based embedder.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Default embedding dimensions.
    pub const DEFAULT_DIMENSIONS: usize = 384;

    /// Creates an embedder with the default dimensions.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_dimensions(Self::DEFAULT_DIMENSIONS)
    }

    /// Creates an embedder with custom dimensions. Zero is raised to one.
    #[must_use]
    pub const fn with_dimensions(dimensions: usize) -> Self {
        let dimensions = if dimensions == 0 { 1 } else { dimensions };
        Self { dimensions }
    }

    /// Distributes a hash value across embedding dimensions.
    #[allow(clippy::cast_precision_loss)]
    #[allow(clippy::cast_possible_truncation)]
    fn distribute_hash(embedding: &mut [f32], hash: u64) {
        let dimensions = embedding.len();
        for j in 0..8 {
            let idx = (hash >> (j * 8)) as usize % dimensions;
            let value = ((hash >> (j * 4)) & 0xFF) as f32 / 255.0 - 0.5;
            embedding[idx] += value;
        }
    }

    /// Normalizes an embedding vector in-place.
    fn normalize_embedding(embedding: &mut [f32]) {
        let norm_sq: f32 = embedding.iter().map(|x| x * x).sum();
        if norm_sq <= 0.0 {
            return;
        }
        let inv_norm = norm_sq.sqrt().recip();
        for v in embedding.iter_mut() {
            *v *= inv_norm;
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let mut seen = 0usize;

        for word in words(text).iter().take(MAX_WORDS) {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            Self::distribute_hash(&mut embedding, hasher.finish());
            seen += 1;
        }

        // Nothing to embed: report "unavailable" instead of a zero vector.
        if seen == 0 {
            return Ok(Vec::new());
        }

        Self::normalize_embedding(&mut embedding);
        Ok(embedding)
    }
}
