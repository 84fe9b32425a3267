#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use anyhow::Context as _;
use args::Args;
use clap::Parser;
use strata_config::Config;
use strata_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    args.apply_overrides(&mut config);
    strata_telemetry::init(&config.telemetry)?;

    tracing::info!(
        config_path = %args.config.display(),
        listen_address = %config.server.listen_address(),
        region = %config.bedrock.region,
        default_model = %config.bedrock.default_model,
        "starting strata"
    );

    // Cancelling this token stops the listener and closes every open stream
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    Server::new(&config, shutdown)
        .await
        .context("failed to build server")?
        .serve()
        .await?;

    tracing::info!("strata stopped");
    Ok(())
}

/// Cancel `shutdown` on the first `SIGINT` or `SIGTERM`
async fn cancel_on_signal(shutdown: CancellationToken) {
    let signal = wait_for_signal().await;
    tracing::info!(signal, "shutdown signal received");
    shutdown.cancel();
}

async fn wait_for_signal() -> &'static str {
    let interrupt = async {
        tokio::signal::ctrl_c().await.expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}
