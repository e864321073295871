//! Storage backend traits.

mod embedding;

pub use embedding::EmbeddingStore;
