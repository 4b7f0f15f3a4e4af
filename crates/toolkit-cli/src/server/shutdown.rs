//! Stop signal handling and the drain deadline that follows it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Process signal that ended the serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Links the stop signal handed to axum with the drain deadline.
///
/// [`stopped`](Self::stopped) resolves on the first stop signal and starts
/// the clock; [`deadline`](Self::deadline) resolves once `timeout` has
/// elapsed after that.
#[derive(Debug, Clone)]
pub struct Shutdown {
    draining: Arc<Notify>,
    timeout: Duration,
}

impl Shutdown {
    pub fn new(timeout: Duration) -> Self {
        Self {
            draining: Arc::new(Notify::new()),
            timeout,
        }
    }

    /// Returns the drain timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves when the process receives SIGINT or SIGTERM.
    pub fn stopped(&self) -> impl Future<Output = ()> + Send + 'static {
        let shutdown = self.clone();
        async move {
            let signal = wait_for_signal().await;
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                %signal,
                timeout_secs = shutdown.timeout.as_secs(),
                "draining in-flight requests"
            );
            shutdown.begin();
        }
    }

    /// Starts the drain clock.
    pub fn begin(&self) {
        self.draining.notify_one();
    }

    /// Resolves once draining has lasted longer than the timeout.
    pub async fn deadline(&self) {
        self.draining.notified().await;
        tokio::time::sleep(self.timeout).await;
    }
}

async fn wait_for_signal() -> StopSignal {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "cannot listen for SIGINT"
            );
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %err,
                    "cannot listen for SIGTERM"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => StopSignal::Interrupt,
        () = terminate => StopSignal::Terminate,
    }
}
