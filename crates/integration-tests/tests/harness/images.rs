//! Local image server for exercising remote image fetches

use std::net::SocketAddr;

use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Router, routing};
use tokio_util::sync::CancellationToken;

/// Bytes served at `/cat.png`
pub const PNG_BYTES: &[u8] = b"\x89PNG fake";

/// Image server with one PNG, one untyped blob and nothing else
pub struct ImageServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl ImageServer {
    pub async fn start() -> anyhow::Result<Self> {
        let app = Router::new()
            .route(
                "/cat.png",
                routing::get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
            )
            .route(
                "/blob",
                routing::get(|| async { ([(header::CONTENT_TYPE, "application/octet-stream")], b"raw".as_slice()) }),
            )
            .fallback(|| async { StatusCode::NOT_FOUND.into_response() });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown_clone.cancelled().await })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for ImageServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
