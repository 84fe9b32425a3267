//! HTTP server assembly for the Strata gateway

mod health;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use strata_adapter::{
    Adapter, AdapterState, BedrockRuntime, CatalogSources, HttpImageFetcher, ImageFetcher, InferenceRuntime,
};
use strata_config::Config;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Timeout for remote image downloads
const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    shutdown: CancellationToken,
}

impl Server {
    /// Build the server from configuration against AWS Bedrock
    ///
    /// Cancelling `shutdown` stops the listener and every open stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the image-fetching HTTP client cannot be built
    pub async fn new(config: &Config, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let runtime = Arc::new(BedrockRuntime::from_config(&config.bedrock).await);
        let http_client = reqwest::Client::builder().timeout(IMAGE_FETCH_TIMEOUT).build()?;
        let images = Arc::new(HttpImageFetcher::new(http_client));
        Ok(Self::with_runtime(config, runtime, images, shutdown))
    }

    /// Build the server around a caller-supplied runtime and image fetcher
    pub fn with_runtime(
        config: &Config,
        runtime: Arc<dyn InferenceRuntime>,
        images: Arc<dyn ImageFetcher>,
        shutdown: CancellationToken,
    ) -> Self {
        let adapter = Adapter::new(runtime, images)
            .with_embedding_models(config.embeddings.supported_models.iter().cloned())
            .with_catalog_sources(CatalogSources {
                inference_profiles: config.bedrock.enable_cross_region_inference,
            });
        let state = AdapterState::new(
            adapter,
            &config.bedrock.default_model,
            &config.bedrock.default_embedding_model,
        );

        let mut app = Router::new();

        // Health check, outside the route prefix
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Adapter routes
        let api = strata_adapter::adapter_router(state);
        let prefix = config.server.route_prefix.trim_end_matches('/');
        app = if prefix.is_empty() { app.merge(api) } else { app.nest(prefix, api) };

        // Request context (innermost, runs just before handlers)
        let context_shutdown = shutdown.clone();
        app = app.layer(axum::middleware::from_fn(move |req, next| {
            let shutdown = context_shutdown.clone();
            async move { request_context::request_context_middleware(shutdown, req, next).await }
        }));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address: config.server.listen_address(),
            shutdown,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the shutdown token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        let shutdown = self.shutdown;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
