//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig     # Host, port, directories, shutdown
//! ├── toolkit: ToolkitConfig   # Body, form and filename limits
//! └── push: ReqwestConfig      # Outbound push client
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.

mod server;

use clap::Parser;
use serde::{Deserialize, Serialize};
pub use server::{ServerConfig, log_server_config};
use toolkit_core::ToolkitConfig;
use toolkit_reqwest::ReqwestConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "toolkit")]
#[command(about = "Demonstration server for the toolkit HTTP helpers")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Request helper limits.
    #[clap(flatten)]
    pub toolkit: ToolkitConfig,

    /// Outbound push client configuration.
    #[clap(flatten)]
    pub push: ReqwestConfig,
}

impl Cli {
    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Logs helper and push configuration.
    pub fn log_config(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_file_size = self.toolkit.effective_max_file_size(),
            max_form_size = self.toolkit.effective_max_form_size(),
            file_name_length = self.toolkit.file_name_length,
            push_timeout_secs = self.push.push_timeout,
            "toolkit configured"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["toolkit"]).unwrap();
        assert_eq!(cli.server.port, 3000);
        assert_eq!(cli.toolkit, ToolkitConfig::default());
        assert_eq!(cli.push, ReqwestConfig::default());
        assert!(cli.server.push_allowed_hosts.is_empty());
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::try_parse_from([
            "toolkit",
            "--port",
            "4000",
            "--max-file-size",
            "2048",
            "--file-name-length",
            "12",
            "--push-timeout",
            "5",
            "--push-allow-host",
            "hooks.example.com,127.0.0.1",
        ])
        .unwrap();
        assert_eq!(cli.server.port, 4000);
        assert_eq!(cli.toolkit.effective_max_file_size(), 2048);
        assert_eq!(cli.toolkit.file_name_length, 12);
        assert_eq!(cli.push.push_timeout, 5);
        assert_eq!(
            cli.server.push_allowed_hosts,
            ["hooks.example.com", "127.0.0.1"]
        );
    }
}
