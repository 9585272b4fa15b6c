//! The `cardroom` server binary.
//!
//! Usage: `cardroom [DATA_DIR]`. Loads the rule catalog from `DATA_DIR`
//! (default `data`), then runs until interrupted. The first Ctrl-C stops
//! new games; the second stops the server.

use std::path::PathBuf;
use std::process::ExitCode;

use cardroom::{CardroomServer, DEFAULT_DATA_DIR};

#[tokio::main]
async fn main() -> ExitCode {
    cardroom::logging::init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let server = match CardroomServer::builder().data_dir(data_dir.clone()).build().await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, data_dir = %data_dir.display(), "failed to start");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(data_dir = %data_dir.display(), "Cardroom server running");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        return ExitCode::FAILURE;
    }
    match server.graceful_shutdown().await {
        Ok(running) => tracing::info!(running, "no new games; Ctrl-C again to stop"),
        Err(e) => tracing::warn!(error = %e, "graceful shutdown failed"),
    }

    let _ = tokio::signal::ctrl_c().await;
    server.shutdown().await;
    ExitCode::SUCCESS
}
