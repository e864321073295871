//! Index CLI command.

use crate::catalog::{ApiCatalog, DirectoryCatalog};
use crate::config::AppConfig;
use crate::services::BackendFactory;
use anyhow::Context;
use std::path::Path;

/// Embeds every catalog API and stores the embeddings.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read, no embedder is configured,
/// or embedding fails.
pub fn cmd_index(config: &AppConfig, catalog_dir: Option<&Path>) -> anyhow::Result<String> {
    let dir = catalog_dir.map_or_else(|| config.resolved_catalog_dir(), Path::to_path_buf);
    let apis = DirectoryCatalog::new(&dir)
        .list_apis()
        .context("listing catalog APIs")?;

    let service = BackendFactory::create_service(config);
    let stored = service
        .index(&apis)
        .context("indexing catalog (is an embedding provider configured?)")?;

    Ok(format!(
        "Indexed {stored} of {} API(s) from {}",
        apis.len(),
        dir.display()
    ))
}
