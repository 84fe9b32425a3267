//! Cohere embed wire format types

use serde::{Deserialize, Serialize};

/// Embed request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Texts to embed
    pub texts: Vec<String>,
    /// Purpose of the embeddings
    pub input_type: String,
    /// Truncation strategy for over-long inputs
    pub truncate: String,
}

/// Embed response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// One vector per text, in input order
    pub embeddings: Vec<Vec<f64>>,
}
