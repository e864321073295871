//! # apidedup
//!
//! Near-duplicate API detection for API catalogs.
//!
//! apidedup compares a newly registered API (endpoints, data models, name and
//! description, plus an optional semantic embedding) against every API already
//! in a catalog and produces a ranked report of likely duplicates with
//! human-readable recommendations.
//!
//! ## Features
//!
//! - Structural scoring: name, description, endpoint path and schema similarity
//! - Optional semantic scoring through any [`Embedder`] and [`EmbeddingStore`]
//! - Weighted score fusion with separate structural and semantic schemes
//! - Brute-force fallback when the embedding store has no native search
//! - Pluggable catalogs, notifiers (webhook, log alerts) and stores (memory, `SQLite`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use apidedup::catalog::{DirectoryCatalog, OpenApiParser};
//! use apidedup::services::{DetectionConfig, DetectionService};
//! use apidedup::TriggerKind;
//!
//! let catalog = DirectoryCatalog::new("./catalog");
//! let api = OpenApiParser::new().parse_specification(&spec_text, "pets-v2");
//! let service = DetectionService::structural(DetectionConfig::default());
//! let report = service.detect(&catalog, &api, TriggerKind::Created)?;
//! for result in &report.results {
//!     println!("{} ({:.2})", result.existing.name, result.overall_score);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod catalog;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod models;
pub mod notify;
pub mod observability;
pub mod services;
pub mod similarity;
pub mod storage;

// Re-exports for convenience
pub use catalog::{ApiCatalog, OpenApiParser};
pub use config::AppConfig;
pub use embedding::Embedder;
pub use models::{
    ApiEmbedding, ApiId, ApiRecord, ComparisonResult, ComponentScores, DetectionMode,
    DetectionReport, Endpoint, EndpointMatch, TriggerKind,
};
pub use notify::Notifier;
pub use services::{DetectionConfig, DetectionService};
pub use storage::EmbeddingStore;

/// Error type for apidedup operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed arguments, embedding dimension mismatches |
/// | `OperationFailed` | I/O, `SQLite`, HTTP or serialization failures |
/// | `CatalogUnavailable` | The candidate corpus could not be fetched |
/// | `NotImplemented` | A collaborator lacks an optional capability |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - An embedding's dimensions do not match the store
    /// - A CLI argument cannot be interpreted
    /// - Configuration values are malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` operations fail
    /// - Filesystem I/O errors occur
    /// - An embedding or webhook HTTP request fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The catalog could not supply candidate APIs.
    ///
    /// Detection cannot proceed without a corpus, so this error is always
    /// propagated to the caller.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Capability not implemented by this collaborator.
    ///
    /// Raised when:
    /// - An embedding store without native nearest-neighbor search is queried
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for apidedup operations.
pub type Result<T> = std::result::Result<T, Error>;
