//! Logging setup for Strata
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a
//! pretty or JSON formatting layer.

use strata_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over the configured filter.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = build_filter(config)?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(config: &TelemetryConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(config.effective_filter())
        .map_err(|e| anyhow::anyhow!("invalid log filter `{}`: {e}", config.effective_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let config = TelemetryConfig {
            log_filter: Some("strata=loud".to_owned()),
            ..TelemetryConfig::default()
        };
        // RUST_LOG would short-circuit the configured filter
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_filter(&config).is_err());
        }
    }

    #[test]
    fn debug_flag_builds_filter() {
        let config = TelemetryConfig {
            debug: true,
            ..TelemetryConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }
}
