use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
    /// Raise the default filter to `debug`
    #[serde(default)]
    pub debug: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            format: LogFormat::Pretty,
            debug: false,
        }
    }
}

impl TelemetryConfig {
    /// Filter directive to install when `RUST_LOG` is unset
    pub fn effective_filter(&self) -> &str {
        match (&self.log_filter, self.debug) {
            (Some(filter), _) => filter,
            (None, true) => "debug",
            (None, false) => "info",
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}
