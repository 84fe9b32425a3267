use super::response::Usage;

/// Output encoding for embedding vectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodingFormat {
    /// Numeric vectors
    #[default]
    Float,
    /// Standard base64 of each vector's JSON text
    Base64,
}

/// Embeddings request
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingsRequest {
    /// Target model identifier
    pub model_id: String,
    /// Raw input, a string or a list
    pub input: serde_json::Value,
    /// Requested output encoding
    pub encoding: EncodingFormat,
}

/// One embedding in the requested encoding
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingValue {
    Float(Vec<f64>),
    Base64(String),
}

/// Embeddings result, one value per accepted input, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingsResult {
    pub model_id: String,
    pub embeddings: Vec<EmbeddingValue>,
    pub usage: Usage,
}
