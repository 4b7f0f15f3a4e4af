//! Reqwest client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Configuration for the client owned by a [`ReqwestPusher`].
///
/// No timeout is set by default: the caller decides how long a push may
/// take.
///
/// [`ReqwestPusher`]: crate::ReqwestPusher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Push request timeout in seconds (0 disables the timeout)
    #[cfg_attr(
        feature = "config",
        arg(long = "push-timeout", env = "PUSH_TIMEOUT", default_value_t = 0)
    )]
    #[serde(default)]
    pub push_timeout: u64,

    /// User-Agent header to send with push requests
    #[cfg_attr(
        feature = "config",
        arg(long = "push-user-agent", env = "PUSH_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ReqwestConfig {
    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.push_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.push_timeout > 0).then(|| Duration::from_secs(self.push_timeout))
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    fn default_user_agent() -> String {
        format!("toolkit/{}", env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReqwestConfig::default();
        assert_eq!(config.push_timeout, 0);
        assert!(config.timeout().is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReqwestConfig::default()
            .with_timeout(15)
            .with_user_agent("custom-agent/1.0");

        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.effective_user_agent(), "custom-agent/1.0");
    }

    #[test]
    fn test_effective_user_agent_uses_default_when_none() {
        let config = ReqwestConfig::default();
        assert!(config.effective_user_agent().starts_with("toolkit/"));
    }
}
