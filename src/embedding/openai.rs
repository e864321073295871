//! OpenAI-compatible embeddings client.

use super::Embedder;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Embedder backed by any `/embeddings` endpoint speaking the `OpenAI` wire
/// format (`OpenAI`, Azure `OpenAI`, local gateways).
pub struct OpenAiEmbedder {
    /// API key.
    api_key: Option<SecretString>,
    /// Base URL, without the `/embeddings` suffix.
    endpoint: String,
    /// Model or deployment name.
    model: String,
    /// Expected dimensions, 0 when unknown.
    dimensions: usize,
    /// Send the key as an Azure `api-key` header instead of a bearer token.
    azure: bool,
    /// Maximum texts per request.
    batch_size: usize,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl OpenAiEmbedder {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "text-embedding-3-small";

    /// Dimensions of the default model.
    pub const DEFAULT_DIMENSIONS: usize = 1536;

    /// Default maximum texts per request.
    pub const DEFAULT_BATCH_SIZE: usize = 64;

    /// Creates a client, reading the key from `OPENAI_API_KEY` when set.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().map(SecretString::from);
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            dimensions: Self::DEFAULT_DIMENSIONS,
            azure: false,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            client: build_http_client(Duration::from_secs(30)),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the expected dimensions.
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Uses the Azure `api-key` header.
    #[must_use]
    pub const fn with_azure(mut self, azure: bool) -> Self {
        self.azure = azure;
        self
    }

    /// Sets the maximum texts per request. Zero is raised to one.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = if batch_size == 0 { 1 } else { batch_size };
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_http_client(timeout);
        self
    }

    fn request(&self, input: &[&str]) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::OperationFailed {
                operation: "embedding_request".to_string(),
                cause: "embedding API key not configured".to_string(),
            })?;

        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let builder = self.client.post(format!("{}/embeddings", self.endpoint));
        let builder = if self.azure {
            builder.header("api-key", api_key.expose_secret())
        } else {
            builder.bearer_auth(api_key.expose_secret())
        };

        let response = builder
            .json(&body)
            .send()
            .map_err(|e| Error::operation("embedding_request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::OperationFailed {
                operation: "embedding_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| Error::operation("embedding_response", e))?;

        order_by_index(parsed.data, input.len())
    }
}

impl Default for OpenAiEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(operation = "embed", model = %self.model, text_length = text.len()))]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[text])?;
        Ok(vectors.pop().unwrap_or_default())
    }

    #[instrument(skip(self, texts), fields(operation = "embed_batch", model = %self.model, count = texts.len()))]
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.request(chunk)?);
        }
        Ok(out)
    }
}

/// Builds a blocking client, falling back to defaults if the builder fails.
fn build_http_client(timeout: Duration) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Failed to build embedding HTTP client: {err}");
            reqwest::blocking::Client::new()
        })
}

/// Places each returned vector at its `index`, so output order matches input.
fn order_by_index(data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(Error::OperationFailed {
            operation: "embedding_response".to_string(),
            cause: format!("expected {expected} embeddings, got {}", data.len()),
        });
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in data {
        let slot = slots.get_mut(item.index).ok_or_else(|| Error::OperationFailed {
            operation: "embedding_response".to_string(),
            cause: format!("embedding index {} out of range", item.index),
        })?;
        *slot = Some(item.embedding);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or_else(|| Error::OperationFailed {
                operation: "embedding_response".to_string(),
                cause: format!("missing embedding for input {i}"),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_index_restores_input_order() {
        let data = vec![
            EmbeddingData {
                index: 1,
                embedding: vec![2.0],
            },
            EmbeddingData {
                index: 0,
                embedding: vec![1.0],
            },
        ];
        let ordered = order_by_index(data, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_order_by_index_rejects_bad_counts() {
        let data = vec![EmbeddingData {
            index: 5,
            embedding: vec![1.0],
        }];
        assert!(order_by_index(data, 1).is_err());
        assert!(order_by_index(Vec::new(), 1).is_err());
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2]}],"model":"m"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
    }

    #[test]
    fn test_missing_key_is_error() {
        let embedder = OpenAiEmbedder {
            api_key: None,
            ..OpenAiEmbedder::new()
        };
        let err = embedder.embed("text").unwrap_err();
        assert!(err.to_string().contains("API key not configured"));
    }

    #[test]
    fn test_builder_trims_endpoint() {
        let embedder = OpenAiEmbedder::new()
            .with_endpoint("http://localhost:8080/v1/")
            .with_batch_size(0);
        assert_eq!(embedder.endpoint, "http://localhost:8080/v1");
        assert_eq!(embedder.batch_size, 1);
    }
}
