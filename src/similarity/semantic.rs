//! Embedding text and vector similarity.

use crate::models::ApiRecord;
use std::fmt::Write as _;

/// Builds the text an API is embedded from.
///
/// Field order is stable so that embeddings stored by earlier runs remain
/// comparable:
///
/// ```text
/// API Name: orders
/// Title: Orders
/// Description: Order management
/// Type: http
/// Endpoints:
/// - POST /orders
///   Summary: Create order
///   OperationId: createOrder
/// Data Models: Order, OrderDto
/// ```
#[must_use]
pub fn create_embedding_text(api: &ApiRecord) -> String {
    let mut text = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(text, "API Name: {}", api.name);
    if let Some(title) = &api.title {
        let _ = writeln!(text, "Title: {title}");
    }
    if let Some(description) = &api.description {
        let _ = writeln!(text, "Description: {description}");
    }
    if let Some(kind) = &api.kind {
        let _ = writeln!(text, "Type: {kind}");
    }

    if !api.endpoints.is_empty() {
        text.push_str("Endpoints:\n");
        for endpoint in &api.endpoints {
            let _ = writeln!(text, "- {} {}", endpoint.method, endpoint.path);
            if let Some(summary) = &endpoint.summary {
                let _ = writeln!(text, "  Summary: {summary}");
            }
            if let Some(description) = &endpoint.description {
                let _ = writeln!(text, "  Description: {description}");
            }
            if let Some(operation_id) = &endpoint.operation_id {
                let _ = writeln!(text, "  OperationId: {operation_id}");
            }
        }
    }

    if !api.schemas.is_empty() {
        let names: Vec<&str> = api.schemas.iter().map(String::as_str).collect();
        let _ = writeln!(text, "Data Models: {}", names.join(", "));
    }

    text.trim_end().to_string()
}

/// Raw cosine similarity in `[-1.0, 1.0]`.
///
/// Returns 0.0 when the lengths differ, either vector is empty, or either
/// magnitude is zero.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Cosine similarity mapped from `[-1, 1]` onto `[0, 1]`.
///
/// Not used by score fusion, which takes raw cosine clamped at zero.
#[must_use]
pub fn normalized_cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    f32::midpoint(cosine_similarity(a, b), 1.0)
}

/// Converts a raw cosine score into a fusion component in `[0, 1]`.
#[must_use]
pub fn semantic_component(raw_cosine: f32) -> f32 {
    if raw_cosine.is_nan() {
        return 0.0;
    }
    raw_cosine.clamp(0.0, 1.0)
}
