//! HTTP server startup and lifecycle management.

mod error;
mod shutdown;

use std::future::IntoFuture;

use axum::Router;
use tokio::net::TcpListener;

pub use self::error::{Result, ServerError};
use self::shutdown::Shutdown;
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Serves `app` until a shutdown signal arrives.
///
/// After the signal, in-flight requests get the configured shutdown
/// timeout to finish.
///
/// # Errors
///
/// Returns an error if the address cannot be bound, the server fails, or
/// draining exceeds the shutdown timeout.
pub async fn serve(app: Router, config: ServerConfig) -> Result<()> {
    let server_addr = config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "failed to bind to address"
        );
        ServerError::BindError {
            address: server_addr.to_string(),
            source: err,
        }
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "server is bound to all interfaces"
        );
    }

    let shutdown = Shutdown::new(config.shutdown_timeout());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.stopped())
        .into_future();

    tokio::select! {
        result = server => result.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "server encountered an error"
            );
            ServerError::Runtime(err)
        })?,
        () = shutdown.deadline() => {
            let timeout_secs = shutdown.timeout().as_secs();
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs,
                "in-flight requests did not finish before the shutdown timeout"
            );
            return Err(ServerError::ShutdownTimeout(timeout_secs));
        }
    }

    tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, "server shut down gracefully");
    Ok(())
}
