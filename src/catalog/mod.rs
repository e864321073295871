//! API catalogs and specification parsing.
//!
//! A catalog supplies the corpus that a new API is compared against.
//!
//! | Catalog | Source |
//! |---------|--------|
//! | [`DirectoryCatalog`] | one `*.json` / `*.yaml` / `*.yml` document per API |
//! | [`InMemoryCatalog`] | a fixed list of records |

mod directory;
mod memory;
mod openapi;

pub use directory::DirectoryCatalog;
pub use memory::InMemoryCatalog;
pub use openapi::OpenApiParser;

use crate::Result;
use crate::models::ApiRecord;

/// Source of registered APIs.
pub trait ApiCatalog: Send + Sync {
    /// Returns every registered API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogUnavailable`](crate::Error::CatalogUnavailable)
    /// if the corpus cannot be fetched.
    fn list_apis(&self) -> Result<Vec<ApiRecord>>;

    /// Resolves an id, name or resource path to a registered API.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn get_api_by_reference(&self, reference: &str) -> Result<Option<ApiRecord>>;

    /// Returns the raw specification text of an API definition.
    ///
    /// `version` and `definition_name` narrow the lookup when the catalog
    /// keeps several versions or definitions per API.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn get_specification_text(
        &self,
        api_name: &str,
        version: Option<&str>,
        definition_name: Option<&str>,
    ) -> Result<Option<String>>;
}
