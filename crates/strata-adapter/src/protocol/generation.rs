//! Role/content generation wire format types (Llama on Bedrock)

use serde::{Deserialize, Serialize};

/// Message in a generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMessage {
    /// Message role
    pub role: String,
    /// Flattened text content
    pub content: String,
}

/// Generation response body, also the shape of each stream chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub generation: String,
    /// Stop reason, `null` on intermediate stream chunks
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Prompt tokens
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    /// Generated tokens
    #[serde(default)]
    pub generation_token_count: Option<u32>,
}
