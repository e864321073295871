//! `OpenAPI` / Swagger document parsing.
//!
//! Supports both `OpenAPI` 3.x (`components.schemas`, `requestBody`) and
//! Swagger 2.0 (`definitions`, `in: body` parameters), in JSON or YAML.
//!
//! # Example
//!
//! ```yaml
//! openapi: 3.0.0
//! info:
//!   title: Pet Store
//!   version: 1.0.0
//! paths:
//!   /pets/{petId}:
//!     get:
//!       operationId: getPet
//!       responses:
//!         "200":
//!           content:
//!             application/json:
//!               schema:
//!                 $ref: "#/components/schemas/Pet"
//! components:
//!   schemas:
//!     Pet: {}
//! ```

use crate::models::{ApiRecord, Endpoint};
use crate::{Error, Result};
use serde_json::Value;
use tracing::instrument;

/// HTTP methods recognized under a path item, in extraction order.
const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Best-effort `OpenAPI` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiParser;

impl OpenApiParser {
    /// Creates a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses `text` into a record named `api_name`.
    ///
    /// Never fails: an unreadable document yields a record with no endpoints
    /// or schemas, and a warning is logged. The raw text is kept on the
    /// record either way.
    #[instrument(skip(self, text), fields(operation = "parse_specification", api_name = %api_name, length = text.len()))]
    pub fn parse_specification(&self, text: &str, api_name: &str) -> ApiRecord {
        match self.try_parse(text, api_name) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(api_name = %api_name, error = %e, "Could not parse specification, using empty record");
                ApiRecord::new(api_name, api_name).with_specification(text)
            },
        }
    }

    /// Strict variant of [`parse_specification`](Self::parse_specification).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the text is neither a JSON nor a
    /// YAML mapping.
    pub fn try_parse(&self, text: &str, api_name: &str) -> Result<ApiRecord> {
        let doc = parse_document(text)?;

        let mut record = ApiRecord::new(api_name, api_name).with_specification(text);
        if doc.get("openapi").is_some() || doc.get("swagger").is_some() {
            record.kind = Some("http".to_string());
        }

        if let Some(info) = doc.get("info") {
            record.title = string_field(info, "title");
            record.description = string_field(info, "description");
            record.version = string_field(info, "version");
        }

        if let Some(paths) = doc.get("paths").and_then(Value::as_object) {
            for (path, item) in paths {
                for method in METHODS {
                    if let Some(operation) = item.get(method) {
                        record.endpoints.push(parse_operation(method, path, operation));
                    }
                }
            }
        }

        let schemas = doc
            .get("components")
            .and_then(|c| c.get("schemas"))
            .or_else(|| doc.get("definitions"))
            .and_then(Value::as_object);
        if let Some(schemas) = schemas {
            record.schemas.extend(schemas.keys().cloned());
        }

        Ok(record)
    }
}

/// Parses JSON first, then YAML. The top level must be a mapping.
fn parse_document(text: &str) -> Result<Value> {
    let value = serde_json::from_str::<Value>(text).or_else(|json_err| {
        serde_yaml_ng::from_str::<Value>(text).map_err(|yaml_err| {
            Error::InvalidInput(format!(
                "not a JSON or YAML document (json: {json_err}; yaml: {yaml_err})"
            ))
        })
    })?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(Error::InvalidInput(
            "specification root is not a mapping".to_string(),
        ))
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_operation(method: &str, path: &str, operation: &Value) -> Endpoint {
    let mut endpoint = Endpoint::new(method, path);
    endpoint.operation_id = string_field(operation, "operationId");
    endpoint.summary = string_field(operation, "summary");
    endpoint.description = string_field(operation, "description");
    endpoint.request_schema = request_schema(operation);
    endpoint.response_schema = response_schema(operation);
    endpoint
}

/// Last segment of a `$ref`, looking through `items` for arrays.
fn schema_ref(schema: &Value) -> Option<String> {
    let reference = schema
        .get("$ref")
        .or_else(|| schema.get("items").and_then(|items| items.get("$ref")))
        .and_then(Value::as_str)?;
    reference
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First `$ref` found under any media type of a `content` map.
fn content_schema_ref(content: Option<&Value>) -> Option<String> {
    content?
        .as_object()?
        .values()
        .find_map(|media| media.get("schema").and_then(schema_ref))
}

fn request_schema(operation: &Value) -> Option<String> {
    if let Some(found) = content_schema_ref(operation.get("requestBody").and_then(|b| b.get("content"))) {
        return Some(found);
    }

    operation
        .get("parameters")
        .and_then(Value::as_array)?
        .iter()
        .filter(|p| p.get("in").and_then(Value::as_str) == Some("body"))
        .find_map(|p| p.get("schema").and_then(schema_ref))
}

fn response_schema(operation: &Value) -> Option<String> {
    let responses = operation.get("responses")?.as_object()?;
    let response = responses
        .iter()
        .find(|(code, _)| code.starts_with('2'))
        .or_else(|| responses.iter().find(|(code, _)| code.as_str() == "default"))
        .map(|(_, response)| response)?;

    content_schema_ref(response.get("content"))
        .or_else(|| response.get("schema").and_then(schema_ref))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENAPI3_YAML: &str = r##"
openapi: 3.0.0
info:
  title: Pet Store
  description: Manage pets
  version: 1.2.0
paths:
  /pets:
    get:
      operationId: listPets
      summary: List pets
      responses:
        "200":
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
    post:
      operationId: createPet
      requestBody:
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/NewPet"
      responses:
        "201":
          description: created
  /pets/{petId}:
    get:
      operationId: getPet
      responses:
        default:
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Error"
components:
  schemas:
    Pet: {}
    NewPet: {}
    Error: {}
"##;

    const SWAGGER2_JSON: &str = r##"{
  "swagger": "2.0",
  "info": {"title": "Legacy Orders", "version": "0.9"},
  "paths": {
    "/orders": {
      "post": {
        "parameters": [
          {"in": "query", "name": "dryRun"},
          {"in": "body", "name": "body", "schema": {"$ref": "#/definitions/OrderRequest"}}
        ],
        "responses": {"200": {"schema": {"$ref": "#/definitions/Order"}}}
      }
    }
  },
  "definitions": {"Order": {}, "OrderRequest": {}}
}"##;

    #[test]
    fn test_parse_openapi3_yaml() {
        let record = OpenApiParser::new().parse_specification(OPENAPI3_YAML, "pets");

        assert_eq!(record.id.as_str(), "pets");
        assert_eq!(record.title.as_deref(), Some("Pet Store"));
        assert_eq!(record.description.as_deref(), Some("Manage pets"));
        assert_eq!(record.version.as_deref(), Some("1.2.0"));
        assert_eq!(record.kind.as_deref(), Some("http"));
        assert_eq!(record.endpoints.len(), 3);

        let list = &record.endpoints[0];
        assert_eq!(list.signature(), "GET /pets");
        assert_eq!(list.operation_id.as_deref(), Some("listPets"));
        assert_eq!(list.summary.as_deref(), Some("List pets"));
        assert_eq!(list.response_schema.as_deref(), Some("Pet"));

        let create = &record.endpoints[1];
        assert_eq!(create.method, "POST");
        assert_eq!(create.request_schema.as_deref(), Some("NewPet"));
        assert!(create.response_schema.is_none());

        assert_eq!(record.endpoints[2].response_schema.as_deref(), Some("Error"));
        assert_eq!(record.schemas.len(), 3);
        assert!(record.specification.is_some());
    }

    #[test]
    fn test_parse_swagger2_json() {
        let record = OpenApiParser::new().parse_specification(SWAGGER2_JSON, "orders");
        assert_eq!(record.title.as_deref(), Some("Legacy Orders"));
        assert_eq!(record.endpoints.len(), 1);

        let endpoint = &record.endpoints[0];
        assert_eq!(endpoint.request_schema.as_deref(), Some("OrderRequest"));
        assert_eq!(endpoint.response_schema.as_deref(), Some("Order"));
        assert!(record.schemas.contains("OrderRequest"));
    }

    #[test]
    fn test_malformed_yields_empty_record() {
        let record = OpenApiParser::new().parse_specification("{ not: [valid", "broken");
        assert_eq!(record.name, "broken");
        assert!(record.endpoints.is_empty());
        assert!(record.schemas.is_empty());
        assert_eq!(record.specification.as_deref(), Some("{ not: [valid"));
    }

    #[test]
    fn test_scalar_document_rejected() {
        assert!(OpenApiParser::new().try_parse("just a string", "x").is_err());
        let record = OpenApiParser::new().parse_specification("just a string", "x");
        assert!(record.endpoints.is_empty());
    }

    #[test]
    fn test_unknown_keys_under_path_ignored() {
        let doc = r#"{"paths": {"/a": {"parameters": [], "summary": "x", "get": {}}}}"#;
        let record = OpenApiParser::new().parse_specification(doc, "a");
        assert_eq!(record.endpoints.len(), 1);
        assert!(record.kind.is_none());
    }
}
