#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod handler;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use toolkit_reqwest::ReqwestPusher;
use toolkit_server::Toolkit;
use tower_http::trace::TraceLayer;

use crate::config::{Cli, log_server_config};
use crate::handler::{AppState, PushTargets, routes};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "toolkit_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "toolkit_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "toolkit_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    Cli::init_tracing();
    log_startup_info();
    log_server_config(&cli.server);
    cli.log_config();

    cli.server
        .validate()
        .context("invalid server configuration")?;

    let state = create_app_state(&cli).await?;
    let router = create_router(state);

    if let Err(error) = server::serve(router, cli.server).await {
        if let Some(suggestion) = error.suggestion() {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_STARTUP,
                recoverable = error.is_recoverable(),
                suggestion,
                "server stopped with error"
            );
        }
        return Err(error.into());
    }

    Ok(())
}

/// Builds the helpers and prepares the upload directory.
async fn create_app_state(cli: &Cli) -> anyhow::Result<AppState> {
    let toolkit = Toolkit::new(cli.toolkit.clone()).context("invalid toolkit configuration")?;
    let pusher = ReqwestPusher::new(cli.push.clone()).context("failed to create push client")?;

    toolkit
        .create_dir(&cli.server.upload_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create upload directory {}",
                cli.server.upload_dir.display()
            )
        })?;

    let state = AppState::new(
        toolkit,
        pusher,
        &cli.server.upload_dir,
        &cli.server.download_dir,
        PushTargets::new(cli.server.push_allowed_hosts.iter().cloned()),
    );

    tracing::debug!(
        target: TRACING_TARGET_CONFIG,
        token_alphabet_len = state.toolkit().tokens().alphabet().len(),
        "application state created"
    );

    Ok(state)
}

/// Creates the router with request tracing applied.
fn create_router(state: AppState) -> Router {
    routes(state).layer(TraceLayer::new_for_http())
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting toolkit server"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
