//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use strata_config::Config;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults and a loopback listener
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        Self { config }
    }

    /// Mount the API under a different prefix
    pub fn with_route_prefix(mut self, prefix: &str) -> Self {
        prefix.clone_into(&mut self.config.server.route_prefix);
        self
    }

    /// Disable the health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Leave inference profiles out of the model listing
    pub fn without_cross_region_inference(mut self) -> Self {
        self.config.bedrock.enable_cross_region_inference = false;
        self
    }

    /// Replace the accepted embedding models
    pub fn with_embedding_models(mut self, models: &[&str]) -> Self {
        self.config.embeddings.supported_models = models.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    /// Set the model used when a chat request omits `model`
    pub fn with_default_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.config.bedrock.default_model);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}
