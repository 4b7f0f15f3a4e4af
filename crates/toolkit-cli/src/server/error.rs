//! Server error types.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Error type for server startup and runtime failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),

    /// Shutdown did not finish within the configured timeout.
    #[error("Graceful shutdown timed out after {0} seconds")]
    ShutdownTimeout(u64),
}

impl ServerError {
    /// Determines if this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::BindError { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::PermissionDenied
                    | io::ErrorKind::AddrInUse
                    | io::ErrorKind::AddrNotAvailable
            ),
            Self::Runtime(err) => matches!(
                err.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            Self::ShutdownTimeout(_) => false,
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::BindError { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    Some("Try using a port above 1024 or run with appropriate privileges")
                }
                io::ErrorKind::AddrInUse => Some(
                    "The port is already in use. Try a different port or stop the conflicting service",
                ),
                _ => Some("Check network configuration and firewall settings"),
            },
            Self::Runtime(_) => None,
            Self::ShutdownTimeout(_) => Some("Increase --shutdown-timeout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_errors_are_recoverable() {
        let error = ServerError::BindError {
            address: "127.0.0.1:3000".into(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(error.is_recoverable());
        assert!(error.suggestion().is_some());
        assert!(error.to_string().contains("127.0.0.1:3000"));
    }

    #[test]
    fn shutdown_timeout_is_not_recoverable() {
        let error = ServerError::ShutdownTimeout(30);
        assert!(!error.is_recoverable());
        assert_eq!(error.to_string(), "Graceful shutdown timed out after 30 seconds");
    }
}
