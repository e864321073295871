//! Directory-backed catalog.

use super::{ApiCatalog, OpenApiParser};
use crate::models::{ApiId, ApiRecord};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// File extensions recognized as API documents.
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Catalog where every document in a directory is one API.
///
/// The file stem is both id and name: `catalog/pet-store.yaml` registers
/// an API named `pet-store`. Subdirectories are not scanned.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    parser: OpenApiParser,
}

impl DirectoryCatalog {
    /// Creates a catalog rooted at `root`. The directory is read lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parser: OpenApiParser::new(),
        }
    }

    /// Catalog root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Document files in the root, sorted by path.
    fn document_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            Error::CatalogUnavailable(format!("{}: {e}", self.root.display()))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_document(p))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn find_path(&self, api_name: &str) -> Result<Option<PathBuf>> {
        Ok(self
            .document_paths()?
            .into_iter()
            .find(|p| file_stem(p).as_deref() == Some(api_name)))
    }

    fn load(&self, path: &Path) -> Option<ApiRecord> {
        let stem = file_stem(path)?;
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let mut record = self.parser.parse_specification(&text, &stem);
                record.id = ApiId::new(stem);
                Some(record)
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable API document");
                None
            },
        }
    }
}

impl ApiCatalog for DirectoryCatalog {
    #[instrument(skip(self), fields(operation = "list_apis", root = %self.root.display()))]
    fn list_apis(&self) -> Result<Vec<ApiRecord>> {
        let apis: Vec<ApiRecord> = self
            .document_paths()?
            .iter()
            .filter_map(|p| self.load(p))
            .collect();
        tracing::debug!(count = apis.len(), "Loaded catalog");
        Ok(apis)
    }

    fn get_api_by_reference(&self, reference: &str) -> Result<Option<ApiRecord>> {
        let reference = reference.trim();
        let found = self.document_paths()?.into_iter().find(|p| {
            let stem = file_stem(p);
            stem.as_deref() == Some(reference)
                || p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| reference.ends_with(name))
        });
        Ok(found.and_then(|p| self.load(&p)))
    }

    fn get_specification_text(
        &self,
        api_name: &str,
        version: Option<&str>,
        _definition_name: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(path) = self.find_path(api_name)? else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(&path).map_err(|e| Error::operation("read_specification", e))?;

        if let Some(wanted) = version {
            let record = self.parser.parse_specification(&text, api_name);
            if record.version.as_deref() != Some(wanted) {
                return Ok(None);
            }
        }
        Ok(Some(text))
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}
