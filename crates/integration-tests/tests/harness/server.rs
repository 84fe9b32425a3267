//! Test server wrapper that starts Strata on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use strata_adapter::HttpImageFetcher;
use strata_config::Config;
use strata_server::Server;
use tokio_util::sync::CancellationToken;

use super::runtime::ScriptedRuntime;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    runtime: Arc<ScriptedRuntime>,
}

impl TestServer {
    /// Start a test server backed by a scripted runtime
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config, runtime: ScriptedRuntime) -> anyhow::Result<Self> {
        let runtime = Arc::new(runtime);
        let shutdown = CancellationToken::new();
        let server = Server::with_runtime(
            &config,
            Arc::clone(&runtime) as _,
            Arc::new(HttpImageFetcher::default()),
            shutdown.clone(),
        );
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self {
            addr,
            shutdown,
            client,
            runtime,
        })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The runtime backing this server
    pub fn runtime(&self) -> &ScriptedRuntime {
        &self.runtime
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
