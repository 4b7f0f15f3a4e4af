//! Facade bundling the helpers with one configuration.

use std::fmt::Display;
use std::path::Path;

use axum::body::Body;
use axum::extract::{Multipart, Request};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use toolkit_core::{RandomTokenGenerator, Result, ToolkitConfig};

use crate::upload::{UploadedFile, Uploader};
use crate::{codec, download, response};

/// Request and response helpers sharing one [`ToolkitConfig`].
///
/// The value is cheap to clone and is meant to live in the router state;
/// [`StrictJson`](crate::StrictJson) reads its body limit from it through
/// [`FromRef`](axum::extract::FromRef).
///
/// # Examples
///
/// ```rust,ignore
/// use axum::body::Body;
/// use toolkit_core::ToolkitConfig;
/// use toolkit_server::Toolkit;
///
/// async fn handler(body: Body) -> toolkit_core::Result<axum::response::Response> {
///     let toolkit = Toolkit::new(ToolkitConfig::default().with_max_file_size(4096))?;
///     let value: serde_json::Value = toolkit.read_json(body).await?;
///     toolkit.write_json(axum::http::StatusCode::OK, &value, None)
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    config: ToolkitConfig,
    tokens: RandomTokenGenerator,
}

impl Toolkit {
    /// Creates a toolkit after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: ToolkitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tokens: RandomTokenGenerator::default(),
        })
    }

    /// Uses `tokens` for random strings and stored filenames.
    #[must_use]
    pub fn with_tokens(mut self, tokens: RandomTokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Returns the token generator.
    #[inline]
    pub fn tokens(&self) -> &RandomTokenGenerator {
        &self.tokens
    }

    /// Returns a random string of `len` characters.
    pub fn random_string(&self, len: usize) -> String {
        self.tokens.generate(len)
    }

    /// Decodes exactly one JSON value from `body` under the configured limit.
    ///
    /// See [`codec::read_json`].
    pub async fn read_json<T>(&self, body: Body) -> Result<T>
    where
        T: DeserializeOwned,
    {
        codec::read_json(body, self.config.max_file_size).await
    }

    /// Encodes `data` into a JSON response.
    ///
    /// See [`codec::write_json`].
    pub fn write_json<T>(
        &self,
        status: StatusCode,
        data: &T,
        headers: Option<&HeaderMap>,
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        codec::write_json(status, data, headers)
    }

    /// Replies with the error envelope.
    ///
    /// See [`response::error_json`].
    pub fn error_json<E>(&self, error: &E, status: Option<StatusCode>) -> Result<Response>
    where
        E: Display + ?Sized,
    {
        response::error_json(error, status)
    }

    /// Returns an [`Uploader`] using this toolkit's limits and tokens.
    pub fn uploader(&self) -> Uploader {
        Uploader::new(&self.config).with_tokens(self.tokens.clone())
    }

    /// Stores every file of `multipart` in `upload_dir`.
    ///
    /// See [`Uploader::upload_files`].
    pub async fn upload_files(
        &self,
        multipart: Multipart,
        upload_dir: impl AsRef<Path>,
    ) -> Result<Vec<UploadedFile>> {
        self.uploader().upload_files(multipart, upload_dir).await
    }

    /// Stores the files of `multipart` and returns the last one.
    ///
    /// See [`Uploader::upload_file`].
    pub async fn upload_file(
        &self,
        multipart: Multipart,
        upload_dir: impl AsRef<Path>,
    ) -> Result<UploadedFile> {
        self.uploader().upload_file(multipart, upload_dir).await
    }

    /// Serves a file as an attachment.
    ///
    /// See [`download::download_file`].
    pub async fn download_file(
        &self,
        request: Request,
        base: impl AsRef<Path>,
        file: &str,
        display_name: &str,
    ) -> Response {
        download::download_file(request, base, file, display_name).await
    }

    /// Creates `path` and its parents unless it already exists.
    ///
    /// See [`toolkit_core::create_dir_if_missing`].
    pub async fn create_dir(&self, path: impl AsRef<Path>) -> Result<()> {
        toolkit_core::create_dir_if_missing(path).await
    }

    /// Logs `error` if present.
    pub fn log_error<E>(&self, error: Option<&E>)
    where
        E: Display + ?Sized,
    {
        toolkit_core::log_error(error);
    }
}

#[cfg(test)]
mod tests {
    use toolkit_core::ErrorKind;

    use super::*;

    #[test]
    fn test_new_validates_config() {
        let error = Toolkit::new(ToolkitConfig::default().with_file_name_length(0)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_random_string_uses_tokens() {
        let toolkit = Toolkit::default().with_tokens(RandomTokenGenerator::with_alphabet("q").unwrap());
        assert_eq!(toolkit.random_string(4), "qqqq");
    }

    #[tokio::test]
    async fn test_read_json_uses_configured_limit() {
        let toolkit = Toolkit::new(ToolkitConfig::default().with_max_file_size(8)).unwrap();
        let error = toolkit
            .read_json::<serde_json::Value>(Body::from(r#"{"key":"value"}"#))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PayloadTooLarge);

        let value: Vec<u8> = toolkit.read_json(Body::from("[1,2]")).await.unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_create_dir_then_upload_dir_exists() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("uploads").join("today");
        let toolkit = Toolkit::default();

        toolkit.create_dir(&dir).await.unwrap();
        toolkit.create_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_uploader_inherits_config() {
        let toolkit = Toolkit::new(ToolkitConfig::default().with_max_form_size(2048)).unwrap();
        assert_eq!(toolkit.uploader().max_form_size(), 2048);
    }
}
