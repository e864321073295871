//! In-memory catalog.

use super::ApiCatalog;
use crate::Result;
use crate::models::ApiRecord;

/// Catalog over a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    apis: Vec<ApiRecord>,
}

impl InMemoryCatalog {
    /// Creates a catalog from `apis`.
    #[must_use]
    pub const fn new(apis: Vec<ApiRecord>) -> Self {
        Self { apis }
    }

    /// Adds an API.
    #[must_use]
    pub fn with_api(mut self, api: ApiRecord) -> Self {
        self.apis.push(api);
        self
    }

    /// Number of registered APIs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.apis.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}

impl ApiCatalog for InMemoryCatalog {
    fn list_apis(&self) -> Result<Vec<ApiRecord>> {
        Ok(self.apis.clone())
    }

    fn get_api_by_reference(&self, reference: &str) -> Result<Option<ApiRecord>> {
        Ok(self
            .apis
            .iter()
            .find(|a| a.id.as_str() == reference || a.name == reference)
            .cloned())
    }

    fn get_specification_text(
        &self,
        api_name: &str,
        version: Option<&str>,
        _definition_name: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(self
            .apis
            .iter()
            .filter(|a| a.name == api_name)
            .find(|a| version.is_none() || a.version.as_deref() == version)
            .and_then(|a| a.specification.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id_or_name() {
        let catalog = InMemoryCatalog::default()
            .with_api(ApiRecord::new("id-1", "pets").with_version("1").with_specification("v1"))
            .with_api(ApiRecord::new("id-2", "pets").with_version("2").with_specification("v2"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get_api_by_reference("id-2").unwrap().unwrap().id.as_str(), "id-2");
        assert_eq!(catalog.get_api_by_reference("pets").unwrap().unwrap().id.as_str(), "id-1");
        assert_eq!(
            catalog.get_specification_text("pets", Some("2"), None).unwrap().as_deref(),
            Some("v2")
        );
        assert!(catalog.get_specification_text("pets", Some("3"), None).unwrap().is_none());
    }
}
