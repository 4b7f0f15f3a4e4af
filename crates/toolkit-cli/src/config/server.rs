//! HTTP server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// HTTP server configuration.
///
/// # Environment Variables
///
/// - `HOST` - Server host address (default: 127.0.0.1)
/// - `PORT` - Server port (default: 3000, valid range: 1024-65535)
/// - `UPLOAD_DIR` - Directory receiving uploads (default: ./uploads)
/// - `DOWNLOAD_DIR` - Directory served by downloads (default: ./files)
/// - `SHUTDOWN_TIMEOUT` - Graceful shutdown timeout in seconds (default: 30, max: 300)
/// - `PUSH_ALLOWED_HOSTS` - Comma-separated hosts `/push` may target (default: none)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Host address to bind the server to.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// TCP port number for the server to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory receiving uploaded files; created on startup.
    #[arg(long, env = "UPLOAD_DIR", default_value = "./uploads")]
    pub upload_dir: PathBuf,

    /// Directory files are downloaded from.
    #[arg(long, env = "DOWNLOAD_DIR", default_value = "./files")]
    pub download_dir: PathBuf,

    /// Maximum time in seconds to wait for graceful shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,

    /// Hosts the push route may send to. The route refuses every target
    /// while this is empty.
    #[arg(long = "push-allow-host", env = "PUSH_ALLOWED_HOSTS", value_delimiter = ',')]
    #[serde(default)]
    pub push_allowed_hosts: Vec<String>,
}

/// Default host address for development.
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl ServerConfig {
    /// Validates all configuration values and returns errors for invalid settings.
    ///
    /// # Errors
    ///
    /// - Port must be 1024-65535
    /// - Shutdown timeout must be 1-300 seconds
    /// - Upload and download directories must not be empty
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.port < 1024 {
            return Err(anyhow!(
                "Port {} is below 1024. Use ports 1024-65535 to avoid requiring root privileges.",
                self.port
            ));
        }

        if self.shutdown_timeout == 0 || self.shutdown_timeout > 300 {
            return Err(anyhow!(
                "Shutdown timeout {} seconds is invalid. Must be between 1 and 300 seconds.",
                self.shutdown_timeout
            ));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow!("Upload directory cannot be empty"));
        }

        if self.download_dir.as_os_str().is_empty() {
            return Err(anyhow!("Download directory cannot be empty"));
        }

        Ok(())
    }

    /// Returns the complete socket address for server binding.
    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the graceful shutdown timeout as a `Duration`.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns whether the server is configured to bind to all interfaces.
    #[must_use]
    pub const fn binds_to_all_interfaces(&self) -> bool {
        match self.host {
            IpAddr::V4(addr) => addr.is_unspecified(),
            IpAddr::V6(addr) => addr.is_unspecified(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 3000,
            upload_dir: PathBuf::from("./uploads"),
            download_dir: PathBuf::from("./files"),
            shutdown_timeout: 30,
            push_allowed_hosts: Vec::new(),
        }
    }
}

/// Logs server configuration details.
pub fn log_server_config(config: &ServerConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        host = %config.host,
        port = config.port,
        upload_dir = %config.upload_dir.display(),
        download_dir = %config.download_dir.display(),
        shutdown_timeout_secs = config.shutdown_timeout,
        push_allowed_hosts = ?config.push_allowed_hosts,
        "server configured"
    );

    if config.push_allowed_hosts.is_empty() {
        tracing::warn!(
            target: TRACING_TARGET_CONFIG,
            "no push hosts allowed, /push will refuse every target"
        );
    }
}
