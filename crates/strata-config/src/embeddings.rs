use serde::Deserialize;

/// Embeddings configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingsConfig {
    /// Model ids accepted by the embeddings endpoint
    #[serde(default = "default_supported_models")]
    pub supported_models: Vec<String>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            supported_models: default_supported_models(),
        }
    }
}

fn default_supported_models() -> Vec<String> {
    vec![
        "cohere.embed-multilingual-v3".to_owned(),
        "cohere.embed-english-v3".to_owned(),
    ]
}
