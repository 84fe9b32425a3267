//! Configuration for the Strata gateway
//!
//! Loaded from a TOML file with `{{ env.VAR }}` placeholder expansion.

#![allow(clippy::must_use_candidate)]

pub mod bedrock;
pub mod embeddings;
mod env;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use bedrock::*;
pub use embeddings::*;
pub use server::*;
pub use telemetry::*;

/// Top-level Strata configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference service configuration
    #[serde(default)]
    pub bedrock: BedrockConfig,
    /// Embeddings configuration
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
