//! API records and endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiId(String);

impl ApiId {
    /// Creates a new API ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ApiId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApiId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single operation exposed by an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP method, always upper case.
    pub method: String,
    /// Path template, e.g. `/pets/{id}`.
    pub path: String,
    /// Operation identifier from the specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the request body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<String>,
    /// Name of the success response schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<String>,
}

impl Endpoint {
    /// Creates an endpoint, upper-casing the method.
    #[must_use]
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().trim().to_uppercase(),
            path: path.into(),
            operation_id: None,
            summary: None,
            description: None,
            request_schema: None,
            response_schema: None,
        }
    }

    /// Sets the operation ID.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the request schema name.
    #[must_use]
    pub fn with_request_schema(mut self, schema: impl Into<String>) -> Self {
        self.request_schema = Some(schema.into());
        self
    }

    /// Sets the response schema name.
    #[must_use]
    pub fn with_response_schema(mut self, schema: impl Into<String>) -> Self {
        self.response_schema = Some(schema.into());
        self
    }

    /// Returns the `METHOD path` signature used in stored embedding metadata.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Parses a `METHOD path` signature.
    ///
    /// A bare path without a method token is read as `GET`, which is how
    /// older stored entries without methods are reconstructed.
    #[must_use]
    pub fn from_signature(signature: &str) -> Self {
        let trimmed = signature.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((method, path)) if !method.starts_with('/') => Self::new(method, path.trim()),
            _ => Self::new("GET", trimmed),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Structured representation of one catalog API.
///
/// Records are built by the catalog or the specification parser and are not
/// mutated while a comparison pass is running.
///
/// # Example
///
/// ```rust
/// use apidedup::models::{ApiRecord, Endpoint};
///
/// let api = ApiRecord::new("pets-v2", "PetV2")
///     .with_endpoint(Endpoint::new("get", "/pets/{id}"))
///     .with_schema("Pet");
///
/// assert_eq!(api.endpoints[0].method, "GET");
/// assert_eq!(api.display_name(), "PetV2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRecord {
    /// Catalog identifier.
    pub id: ApiId,
    /// API name, unique per catalog.
    pub name: String,
    /// Human-facing title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API kind, e.g. `http`, `graphql`, `soap`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Version label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Endpoints in specification order.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Data model names.
    #[serde(default)]
    pub schemas: BTreeSet<String>,
    /// Raw specification document, when known.
    #[serde(default, skip_serializing)]
    pub specification: Option<String>,
}

impl ApiRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new(id: impl Into<ApiId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            description: None,
            kind: None,
            version: None,
            endpoints: Vec::new(),
            schemas: BTreeSet::new(),
            specification: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the kind.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Appends an endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Adds a schema name.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schemas.insert(schema.into());
        self
    }

    /// Attaches the raw specification text.
    #[must_use]
    pub fn with_specification(mut self, text: impl Into<String>) -> Self {
        self.specification = Some(text.into());
        self
    }

    /// Title when present, otherwise the name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Returns true if `other` is the same catalog entry (same id or same name).
    #[must_use]
    pub fn is_same_api(&self, other: &Self) -> bool {
        self.id == other.id || self.name == other.name
    }
}
