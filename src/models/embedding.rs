//! Stored API embeddings.

use super::{ApiId, ApiRecord, Endpoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An embedding vector for one API plus the metadata needed to rebuild a
/// lightweight [`ApiRecord`] without going back to the catalog.
///
/// Stores key embeddings by [`api_name`](Self::api_name); a newer embedding
/// for the same name replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEmbedding {
    /// Catalog identifier of the embedded API.
    pub api_id: ApiId,
    /// API name (store key).
    pub api_name: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Text the vector was derived from.
    pub text: String,
    /// When the embedding was generated.
    pub generated_at: DateTime<Utc>,
    /// Title at embedding time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description at embedding time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind at embedding time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Endpoints as `METHOD path` signatures.
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Schema names.
    #[serde(default)]
    pub schemas: Vec<String>,
}

impl ApiEmbedding {
    /// Captures an embedding for `api`.
    #[must_use]
    pub fn from_api(api: &ApiRecord, vector: Vec<f32>, text: impl Into<String>) -> Self {
        Self {
            api_id: api.id.clone(),
            api_name: api.name.clone(),
            vector,
            text: text.into(),
            generated_at: Utc::now(),
            title: api.title.clone(),
            description: api.description.clone(),
            kind: api.kind.clone(),
            endpoints: api.endpoints.iter().map(Endpoint::signature).collect(),
            schemas: api.schemas.iter().cloned().collect(),
        }
    }

    /// Embedding dimensionality.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Returns true if the vector carries no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Rebuilds a lightweight record from the stored metadata.
    ///
    /// Endpoint summaries, operation IDs and schema references are not kept in
    /// the store, so the rebuilt record only carries method and path.
    #[must_use]
    pub fn to_api_record(&self) -> ApiRecord {
        ApiRecord {
            id: self.api_id.clone(),
            name: self.api_name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.kind.clone(),
            version: None,
            endpoints: self
                .endpoints
                .iter()
                .map(|s| Endpoint::from_signature(s))
                .collect(),
            schemas: self.schemas.iter().cloned().collect::<BTreeSet<_>>(),
            specification: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_record() {
        let api = ApiRecord::new("orders-1", "orders")
            .with_title("Orders")
            .with_description("Order management")
            .with_endpoint(Endpoint::new("post", "/orders"))
            .with_endpoint(Endpoint::new("get", "/orders/{id}"))
            .with_schema("OrderDto");

        let embedding = ApiEmbedding::from_api(&api, vec![0.1, 0.2], "text");
        let rebuilt = embedding.to_api_record();

        assert_eq!(rebuilt.id, api.id);
        assert_eq!(rebuilt.name, "orders");
        assert_eq!(rebuilt.title.as_deref(), Some("Orders"));
        assert_eq!(rebuilt.endpoints.len(), 2);
        assert_eq!(rebuilt.endpoints[0].method, "POST");
        assert_eq!(rebuilt.endpoints[1].path, "/orders/{id}");
        assert!(rebuilt.schemas.contains("OrderDto"));
        assert_eq!(embedding.dimensions(), 2);
    }
}
