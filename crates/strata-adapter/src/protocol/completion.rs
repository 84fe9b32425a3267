//! Legacy Anthropic text completion wire format types

use serde::{Deserialize, Serialize};

/// Text completion request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Linearized `Human:`/`Assistant:` transcript
    pub prompt: String,
    /// System text, kept out of the transcript
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens_to_sample: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

/// Text completion response body, also the shape of each stream chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub completion: String,
    /// Stop reason, `null` on intermediate stream chunks
    #[serde(default)]
    pub stop_reason: Option<String>,
}
