use std::path::PathBuf;

use clap::Parser;
use strata_config::Config;

/// Strata gateway
#[derive(Debug, Parser)]
#[command(name = "strata", about = "OpenAI-compatible gateway for AWS Bedrock models")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "strata.toml", env = "STRATA_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "STRATA_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(listen) = self.listen {
            config.server.listen_address = Some(listen);
        }
    }
}
