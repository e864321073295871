//! CLI command implementations.
//!
//! Each command returns its rendered output; the binary prints it.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `detect` | Check one specification against the catalog |
//! | `compare` | Score two specifications against each other |
//! | `index` | Embed every catalog API into the embedding store |
//! | `config` | Show the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! # Check a new API before registering it
//! apidedup detect specs/pets-v2.yaml --catalog ./catalog --threshold 0.6
//!
//! # Compare two documents directly
//! apidedup compare specs/pets-v2.yaml catalog/petstore.json --format json
//!
//! # Build embeddings for semantic detection
//! APIDEDUP_EMBEDDING_PROVIDER=hash APIDEDUP_STORE=sqlite apidedup index
//! ```

mod compare;
mod config;
mod detect;
mod index;
mod render;

pub use compare::cmd_compare;
pub use config::cmd_config;
pub use detect::{DetectArgs, cmd_detect};
pub use index::cmd_index;
pub use render::{render_comparison, render_report};

use crate::catalog::OpenApiParser;
use crate::models::{ApiId, ApiRecord};
use anyhow::Context;
use std::path::Path;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Reads and parses a specification file.
///
/// The API name defaults to the file stem, and the id to the name, which
/// matches how [`DirectoryCatalog`](crate::catalog::DirectoryCatalog) names
/// its records.
pub(crate) fn load_api(path: &Path, name: Option<&str>, id: Option<&str>) -> anyhow::Result<ApiRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading specification {}", path.display()))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("api")
        .to_string();
    let name = name.map_or(stem, str::to_string);

    let mut api = OpenApiParser::new().parse_specification(&text, &name);
    if let Some(id) = id {
        api.id = ApiId::new(id);
    }
    Ok(api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_api_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pets-v2.json");
        std::fs::write(&path, r#"{"openapi":"3.0.0","info":{"title":"Pets"},"paths":{}}"#).unwrap();

        let api = load_api(&path, None, None).unwrap();
        assert_eq!(api.name, "pets-v2");
        assert_eq!(api.id.as_str(), "pets-v2");
        assert_eq!(api.title.as_deref(), Some("Pets"));

        let api = load_api(&path, Some("pets"), Some("api-42")).unwrap();
        assert_eq!(api.name, "pets");
        assert_eq!(api.id.as_str(), "api-42");
    }

    #[test]
    fn test_load_api_missing_file() {
        let err = load_api(Path::new("/nonexistent/spec.yaml"), None, None).unwrap_err();
        assert!(err.to_string().contains("reading specification"));
    }
}
