//! Reqwest-based JSON pusher.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use toolkit_core::Result;

use crate::ReqwestConfig;
use crate::error::transport_error;
use crate::push::push_json_to_remote;

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "toolkit_reqwest::client";

/// Inner pusher that holds the HTTP client and configuration.
struct ReqwestPusherInner {
    http: Client,
    config: ReqwestConfig,
}

/// Pushes JSON payloads to remote endpoints with its own client.
///
/// Cloning is cheap and clones share the connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use toolkit_reqwest::{ReqwestConfig, ReqwestPusher};
///
/// let pusher = ReqwestPusher::new(ReqwestConfig::default().with_timeout(10))?;
/// let status = pusher.push_json("https://example.com/hook", &payload).await?;
/// ```
#[derive(Clone)]
pub struct ReqwestPusher {
    inner: Arc<ReqwestPusherInner>,
}

impl std::fmt::Debug for ReqwestPusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestPusher")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestPusher {
    /// Creates a new pusher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        let user_agent = config.effective_user_agent();
        let mut builder = Client::builder().user_agent(&user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(transport_error)?;

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_secs = config.push_timeout,
            user_agent = %user_agent,
            "reqwest pusher created"
        );

        Ok(Self::from_client(http, config))
    }

    /// Wraps an already configured client.
    pub fn from_client(http: Client, config: ReqwestConfig) -> Self {
        let inner = ReqwestPusherInner { http, config };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Gets the underlying HTTP client.
    pub fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Gets the pusher configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// POSTs `data` to `url` as tab-indented JSON and returns the remote status.
    ///
    /// See [`push_json_to_remote`].
    pub async fn push_json<T>(&self, url: &str, data: &T) -> Result<StatusCode>
    where
        T: Serialize + ?Sized,
    {
        push_json_to_remote(&self.inner.http, url, data).await
    }
}
