use std::net::SocketAddr;

use serde::Deserialize;

/// HTTP listener and routing configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind (defaults to `0.0.0.0:8000`)
    #[serde(default)]
    pub listen_address: Option<SocketAddr>,
    /// Prefix under which all API routes are mounted
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    /// Health endpoint
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            route_prefix: default_route_prefix(),
            health: HealthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Resolved listen address
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)))
    }
}

fn default_route_prefix() -> String {
    "/api/v1".to_owned()
}

/// Health check endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Whether the endpoint is mounted
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Path of the endpoint (not affected by the route prefix)
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_health_path(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_owned()
}
