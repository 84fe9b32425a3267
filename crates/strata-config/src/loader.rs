use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_bedrock()?;
        self.validate_embeddings()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let prefix = &self.server.route_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            anyhow::bail!("server.route_prefix must start with '/': `{prefix}`");
        }
        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }
        Ok(())
    }

    fn validate_bedrock(&self) -> anyhow::Result<()> {
        if self.bedrock.region.trim().is_empty() {
            anyhow::bail!("bedrock.region must not be empty");
        }

        // Static credentials only make sense as a pair
        if self.bedrock.access_key_id.is_some() != self.bedrock.secret_access_key.is_some() {
            anyhow::bail!("bedrock.access_key_id and bedrock.secret_access_key must be set together");
        }

        Ok(())
    }

    fn validate_embeddings(&self) -> anyhow::Result<()> {
        if self.embeddings.supported_models.is_empty() {
            anyhow::bail!("embeddings.supported_models must list at least one model");
        }
        if !self
            .embeddings
            .supported_models
            .contains(&self.bedrock.default_embedding_model)
        {
            tracing::warn!(
                model = %self.bedrock.default_embedding_model,
                "default embedding model is not in embeddings.supported_models"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, LogFormat};

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.route_prefix, "/api/v1");
        assert_eq!(config.server.listen_address().port(), 8000);
        assert_eq!(config.bedrock.region, "us-east-1");
        assert!(config.bedrock.enable_cross_region_inference);
        assert_eq!(config.embeddings.supported_models.len(), 2);
        assert_eq!(config.telemetry.effective_filter(), "info");
    }

    #[test]
    fn full_file_parses() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:9000"
            route_prefix = "/v1"

            [server.health]
            path = "/healthz"

            [bedrock]
            region = "eu-central-1"
            default_model = "meta.llama3-8b-instruct-v1:0"
            enable_cross_region_inference = false

            [embeddings]
            supported_models = ["cohere.embed-english-v3"]

            [telemetry]
            format = "json"
            debug = true
        "#;

        let config = Config::from_toml(raw).unwrap();
        assert_eq!(config.server.listen_address().port(), 9000);
        assert_eq!(config.server.route_prefix, "/v1");
        assert_eq!(config.server.health.path, "/healthz");
        assert_eq!(config.bedrock.region, "eu-central-1");
        assert!(!config.bedrock.enable_cross_region_inference);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        assert_eq!(config.telemetry.effective_filter(), "debug");
    }

    #[test]
    fn region_from_environment() {
        temp_env::with_var("STRATA_TEST_AWS_REGION", Some("us-west-2"), || {
            let config = Config::from_toml("[bedrock]\nregion = \"{{ env.STRATA_TEST_AWS_REGION }}\"\n").unwrap();
            assert_eq!(config.bedrock.region, "us-west-2");
        });
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml("[bedrock]\nregoin = \"us-east-1\"\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn half_credentials_are_rejected() {
        let err = Config::from_toml("[bedrock]\naccess_key_id = \"AKIA\"\n").unwrap_err();
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn relative_prefix_is_rejected() {
        let err = Config::from_toml("[server]\nroute_prefix = \"api\"\n").unwrap_err();
        assert!(err.to_string().contains("route_prefix"));
    }

    #[test]
    fn empty_embedding_set_is_rejected() {
        let err = Config::from_toml("[embeddings]\nsupported_models = []\n").unwrap_err();
        assert!(err.to_string().contains("supported_models"));
    }
}
