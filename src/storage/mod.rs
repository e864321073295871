//! Embedding storage.
//!
//! - **Memory**: `HashMap` behind a mutex; top-K search ranks the map in
//!   place with [`rank_by_similarity`] and clones only the `k` survivors
//! - **`SQLite`**: durable store without top-K search; detection loads every
//!   row and ranks it with the same function

// Allow significant_drop_tightening - dropping guards slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryEmbeddingStore;
pub use sqlite::SqliteEmbeddingStore;
pub use traits::EmbeddingStore;

use crate::models::ApiEmbedding;
use crate::similarity::cosine_similarity;
use std::borrow::Borrow;

/// Ranks `entries` by raw cosine similarity to `query` and keeps the best `k`.
///
/// The entry named `exclude` and entries with empty vectors are dropped.
/// Ties are ordered by API name. Entries may be owned or borrowed, so a
/// store can rank in place and clone only the survivors.
#[must_use]
pub fn rank_by_similarity<I, E>(
    entries: I,
    query: &[f32],
    k: usize,
    exclude: Option<&str>,
) -> Vec<(E, f32)>
where
    I: IntoIterator<Item = E>,
    E: Borrow<ApiEmbedding>,
{
    let mut scored: Vec<(E, f32)> = entries
        .into_iter()
        .filter(|e| !e.borrow().is_empty())
        .filter(|e| exclude.is_none_or(|name| e.borrow().api_name != name))
        .map(|e| {
            let score = cosine_similarity(query, &e.borrow().vector);
            (e, score)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.0.borrow().api_name.cmp(&b.0.borrow().api_name))
    });
    scored.truncate(k);
    scored
}
