use secrecy::SecretString;
use serde::Deserialize;

/// AWS Bedrock connection and model defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BedrockConfig {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID (optional, uses default credential chain if absent)
    #[serde(default)]
    pub access_key_id: Option<SecretString>,
    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
    /// Model used when a chat request omits `model`
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Model used when an embeddings request omits `model`
    #[serde(default = "default_embedding_model")]
    pub default_embedding_model: String,
    /// List system-defined inference profiles alongside foundation models
    #[serde(default = "default_true")]
    pub enable_cross_region_inference: bool,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            default_model: default_model(),
            default_embedding_model: default_embedding_model(),
            enable_cross_region_inference: true,
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_model() -> String {
    "anthropic.claude-3-sonnet-20240229-v1:0".to_owned()
}

fn default_embedding_model() -> String {
    "cohere.embed-multilingual-v3".to_owned()
}

const fn default_true() -> bool {
    true
}
