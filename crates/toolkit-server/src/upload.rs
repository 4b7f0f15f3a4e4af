//! Multipart upload ingestion.
//!
//! Each file part of a multipart form is written to the upload directory
//! under a fresh random name whose extension comes from the part's content,
//! detected from its leading bytes. Client-supplied filenames and content
//! types are recorded but never trusted.
//!
//! # Limitations
//!
//! Ingestion stops at the first error. Files already written by the same
//! call stay on disk; callers that need all-or-nothing semantics must remove
//! them.
//!
//! The [`Multipart`] extractor enforces axum's 2 MiB default body limit
//! before the uploader sees any byte. Routes accepting larger forms must be
//! layered with [`Uploader::body_limit`].

use std::path::Path;

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use toolkit_core::{Error, ErrorKind, RandomTokenGenerator, Result, ToolkitConfig};

use crate::sniff::{self, SNIFF_LEN};

/// Tracing target for upload operations.
pub const TRACING_TARGET: &str = "toolkit_server::upload";

/// A file stored by the [`Uploader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Name of the stored file inside the upload directory.
    pub new_file_name: String,
    /// Filename the client sent with the part.
    pub original_file_name: String,
    /// Number of bytes written.
    pub file_size: u64,
    /// Media type detected from the content, with parameters such as
    /// `charset` when the type carries them.
    pub content_type: String,
}

/// Stores multipart file uploads under random names.
///
/// The route serving the upload needs [`body_limit`](Self::body_limit) as a
/// layer, otherwise forms above 2 MiB are rejected by the extractor.
///
/// # Examples
///
/// ```rust,ignore
/// use axum::Router;
/// use axum::extract::Multipart;
/// use axum::routing::post;
/// use toolkit_server::Uploader;
///
/// async fn upload(multipart: Multipart) -> toolkit_core::Result<()> {
///     let uploader = Uploader::default();
///     for file in uploader.upload_files(multipart, "./uploads").await? {
///         println!("{} -> {}", file.original_file_name, file.new_file_name);
///     }
///     Ok(())
/// }
///
/// let router: Router = Router::new()
///     .route("/upload", post(upload).layer(Uploader::default().body_limit()));
/// ```
#[derive(Debug, Clone)]
pub struct Uploader {
    tokens: RandomTokenGenerator,
    max_form_size: u64,
    file_name_length: usize,
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new(&ToolkitConfig::default())
    }
}

impl Uploader {
    /// Creates an uploader using the limits of `config`.
    pub fn new(config: &ToolkitConfig) -> Self {
        Self {
            tokens: RandomTokenGenerator::default(),
            max_form_size: config.effective_max_form_size(),
            file_name_length: config.file_name_length,
        }
    }

    /// Uses `tokens` to generate stored filenames.
    #[must_use]
    pub fn with_tokens(mut self, tokens: RandomTokenGenerator) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sets the ceiling on the total bytes read from one form.
    #[must_use]
    pub fn with_max_form_size(mut self, max_form_size: u64) -> Self {
        self.max_form_size = max_form_size;
        self
    }

    /// Returns the ceiling on the total bytes read from one form.
    pub fn max_form_size(&self) -> u64 {
        self.max_form_size
    }

    /// Returns a layer raising the request body limit to the form ceiling.
    pub fn body_limit(&self) -> DefaultBodyLimit {
        DefaultBodyLimit::max(usize::try_from(self.max_form_size).unwrap_or(usize::MAX))
    }

    /// Stores every file part of `multipart` in `upload_dir`.
    ///
    /// Parts without a filename, or with an empty one, are read and
    /// discarded. Directory components of client filenames are dropped. Several files under
    /// the same field name are all stored. The result holds one entry per
    /// stored file, in the order the parts arrived.
    ///
    /// `upload_dir` must already exist; see
    /// [`create_dir_if_missing`](toolkit_core::create_dir_if_missing).
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::FormTooLarge`] once the form exceeds the ceiling.
    /// - [`ErrorKind::FormParse`] if the multipart stream is malformed.
    /// - [`ErrorKind::Detection`] if the part fails while its leading bytes
    ///   are read for detection.
    /// - [`ErrorKind::Io`] if the destination cannot be created or written.
    #[tracing::instrument(skip_all, fields(upload_dir = %upload_dir.as_ref().display()))]
    pub async fn upload_files(
        &self,
        mut multipart: Multipart,
        upload_dir: impl AsRef<Path>,
    ) -> Result<Vec<UploadedFile>> {
        let upload_dir = upload_dir.as_ref();
        let mut budget = FormBudget::new(self.max_form_size);
        let mut uploaded = Vec::new();

        tracing::debug!(target: TRACING_TARGET, "starting file upload");

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| multipart_error(err, ErrorKind::FormParse))?
        {
            let Some(original_file_name) = field.file_name().and_then(base_name) else {
                tracing::debug!(
                    target: TRACING_TARGET,
                    field = field.name().unwrap_or_default(),
                    "skipping field without filename"
                );
                self.drain(field, &mut budget).await?;
                continue;
            };

            let file = self
                .store(field, original_file_name, upload_dir, &mut budget)
                .await?;
            uploaded.push(file);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            file_count = uploaded.len(),
            form_bytes = budget.used,
            "file upload completed"
        );

        Ok(uploaded)
    }

    /// Stores the files of `multipart` and returns the last one.
    ///
    /// Every file part is still written to disk; only the metadata of the
    /// last one is returned. Use [`upload_files`](Self::upload_files) to
    /// get all of them.
    ///
    /// # Errors
    ///
    /// Same as [`upload_files`](Self::upload_files), plus
    /// [`ErrorKind::FormParse`] when the form holds no file part.
    pub async fn upload_file(
        &self,
        multipart: Multipart,
        upload_dir: impl AsRef<Path>,
    ) -> Result<UploadedFile> {
        self.upload_files(multipart, upload_dir)
            .await?
            .pop()
            .ok_or_else(|| Error::form_parse("multipart form contains no file"))
    }

    async fn store(
        &self,
        mut field: Field<'_>,
        original_file_name: String,
        upload_dir: &Path,
        budget: &mut FormBudget,
    ) -> Result<UploadedFile> {
        // Buffer the leading bytes for detection; they are written out first.
        let mut head = Vec::with_capacity(SNIFF_LEN);
        while head.len() < SNIFF_LEN {
            let chunk = field
                .chunk()
                .await
                .map_err(|err| multipart_error(err, ErrorKind::Detection))?;
            let Some(chunk) = chunk else { break };
            budget.consume(chunk.len())?;
            head.extend_from_slice(&chunk);
        }

        let mime = sniff::detect(&head);
        let new_file_name = format!(
            "{}{}",
            self.tokens.generate(self.file_name_length),
            mime.extension()
        );
        let path = upload_dir.join(&new_file_name);

        tracing::debug!(
            target: TRACING_TARGET,
            original_file_name = %original_file_name,
            new_file_name = %new_file_name,
            content_type = %mime,
            "storing uploaded file"
        );

        let mut file = File::create(&path).await.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                path = %path.display(),
                "failed to create upload destination"
            );
            Error::from(err)
        })?;

        file.write_all(&head).await?;
        let mut file_size = head.len() as u64;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_error(err, ErrorKind::FormParse))?
        {
            budget.consume(chunk.len())?;
            file.write_all(&chunk).await?;
            file_size += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            new_file_name = %new_file_name,
            size = file_size,
            "uploaded file stored"
        );

        Ok(UploadedFile {
            new_file_name,
            original_file_name,
            file_size,
            content_type: mime.mime().to_owned(),
        })
    }

    async fn drain(&self, mut field: Field<'_>, budget: &mut FormBudget) -> Result<()> {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_error(err, ErrorKind::FormParse))?
        {
            budget.consume(chunk.len())?;
        }
        Ok(())
    }
}

/// Running total of bytes read from one form.
#[derive(Debug)]
struct FormBudget {
    limit: u64,
    used: u64,
}

impl FormBudget {
    fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    fn consume(&mut self, len: usize) -> Result<()> {
        self.used = self.used.saturating_add(len as u64);
        if self.used > self.limit {
            tracing::warn!(
                target: TRACING_TARGET,
                limit = self.limit,
                "multipart form exceeds limit"
            );
            return Err(Error::form_too_large(self.limit));
        }
        Ok(())
    }
}

/// Returns the last path component of a client filename, if any is left.
fn base_name(file_name: &str) -> Option<String> {
    let name = file_name
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    (!name.is_empty()).then(|| name.to_owned())
}

/// Maps a multipart failure, treating body limit rejections as oversize.
fn multipart_error(err: MultipartError, kind: ErrorKind) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(target: TRACING_TARGET, error = %err, "request body limit reached");
        return Error::new(ErrorKind::FormTooLarge, err.body_text()).with_source(err);
    }
    tracing::error!(target: TRACING_TARGET, error = %err, "failed to read multipart data");
    Error::new(kind, err.body_text()).with_source(err)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::{FromRequest, Request};
    use axum::http::header::CONTENT_TYPE;
    use axum::routing::post;
    use axum::{Json, Router};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "toolkit-test-boundary";

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        data: &'a [u8],
    }

    fn file<'a>(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Part<'a> {
        Part {
            name,
            file_name: Some(file_name),
            data,
        }
    }

    fn text<'a>(name: &'a str, data: &'a str) -> Part<'a> {
        Part {
            name,
            file_name: None,
            data: data.as_bytes(),
        }
    }

    fn form_request(parts: &[Part<'_>]) -> Request {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match part.file_name {
                Some(file_name) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: text/plain\r\n\r\n",
                    part.name
                ),
                None => format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                ),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        Multipart::from_request(form_request(parts), &()).await.unwrap()
    }

    /// Routes `request` to a handler storing files in `dir`.
    async fn upload_route(
        uploader: Uploader,
        dir: &Path,
        limit: Option<DefaultBodyLimit>,
        request: Request,
    ) -> axum::response::Response {
        let dir = dir.to_path_buf();
        let handler = move |multipart: Multipart| {
            let uploader = uploader.clone();
            let dir = dir.clone();
            async move { uploader.upload_files(multipart, dir).await.map(Json) }
        };

        let mut route = post(handler);
        if let Some(limit) = limit {
            route = route.layer(limit);
        }
        Router::new()
            .route("/upload", route)
            .oneshot(request)
            .await
            .unwrap()
    }

    fn png() -> Vec<u8> {
        let mut data = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec();
        data.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0, 0x1f, 0x15, 0xc4, 0x89]);
        data
    }

    #[tokio::test]
    async fn test_png_named_txt_is_stored_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let data = png();
        let form = multipart(&[file("file", "photo.txt", &data)]).await;

        let uploaded = Uploader::default().upload_file(form, dir.path()).await.unwrap();

        assert!(uploaded.new_file_name.ends_with(".png"));
        assert_eq!(uploaded.new_file_name.len(), 25 + ".png".len());
        assert_eq!(uploaded.original_file_name, "photo.txt");
        assert_eq!(uploaded.content_type, "image/png");
        assert_eq!(uploaded.file_size, data.len() as u64);

        let stored = std::fs::read(dir.path().join(&uploaded.new_file_name)).unwrap();
        assert_eq!(stored, data);
    }

    #[tokio::test]
    async fn test_large_file_is_copied_whole() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let form = multipart(&[file("file", "blob.bin", &data)]).await;

        let uploaded = Uploader::default().upload_file(form, dir.path()).await.unwrap();

        assert_eq!(uploaded.file_size, data.len() as u64);
        let stored = std::fs::read(dir.path().join(&uploaded.new_file_name)).unwrap();
        assert_eq!(stored, data);
    }

    #[tokio::test]
    async fn test_every_file_is_reported_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let image = png();
        let form = multipart(&[
            file("files", "first.png", &image),
            text("note", "not a file"),
            file("files", "second.dat", b"plain text contents"),
        ])
        .await;

        let uploaded = Uploader::default()
            .upload_files(form, dir.path())
            .await
            .unwrap();

        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0].original_file_name, "first.png");
        assert!(uploaded[0].new_file_name.ends_with(".png"));
        assert_eq!(uploaded[1].original_file_name, "second.dat");
        assert!(uploaded[1].new_file_name.ends_with(".txt"));
        assert_ne!(uploaded[0].new_file_name, uploaded[1].new_file_name);

        let stored = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(stored, 2);
    }

    #[tokio::test]
    async fn test_upload_file_returns_last() {
        let dir = tempfile::tempdir().unwrap();
        let image = png();
        let form = multipart(&[
            file("a", "one.png", &image),
            file("b", "two.txt", b"hello"),
        ])
        .await;

        let uploaded = Uploader::default().upload_file(form, dir.path()).await.unwrap();
        assert_eq!(uploaded.original_file_name, "two.txt");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_form_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[text("name", "value")]).await;

        let uploaded = Uploader::default()
            .upload_files(form, dir.path())
            .await
            .unwrap();
        assert!(uploaded.is_empty());

        let form = multipart(&[text("name", "value")]).await;
        let error = Uploader::default()
            .upload_file(form, dir.path())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FormParse);
    }

    #[tokio::test]
    async fn test_form_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![b'a'; 4096];
        let form = multipart(&[file("file", "big.txt", &data)]).await;

        let error = Uploader::default()
            .with_max_form_size(1024)
            .upload_files(form, dir.path())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::FormTooLarge);
    }

    #[tokio::test]
    async fn test_empty_filename_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[file("attachment", "", b"")]).await;

        let uploaded = Uploader::default()
            .upload_files(form, dir.path())
            .await
            .unwrap();

        assert!(uploaded.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_original_name_drops_directories() {
        let dir = tempfile::tempdir().unwrap();
        let image = png();
        let form = multipart(&[
            file("a", "scans/2024/scan.png", &image),
            file("b", "../../etc/notes.txt", b"hello"),
        ])
        .await;

        let uploaded = Uploader::default()
            .upload_files(form, dir.path())
            .await
            .unwrap();

        assert_eq!(uploaded[0].original_file_name, "scan.png");
        assert_eq!(uploaded[1].original_file_name, "notes.txt");
        assert_eq!(uploaded[1].content_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("photo.png").as_deref(), Some("photo.png"));
        assert_eq!(base_name("dir/sub/photo.png").as_deref(), Some("photo.png"));
        assert_eq!(base_name("C:\\fakepath\\a.png").as_deref(), Some("a.png"));
        assert_eq!(base_name("trailing/"), Some("trailing".to_owned()));
        assert_eq!(base_name(""), None);
        assert_eq!(base_name("/"), None);
    }

    #[tokio::test]
    async fn test_body_limit_admits_forms_above_extractor_default() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![b'a'; 3 * 1024 * 1024];
        let uploader = Uploader::default();
        let limit = uploader.body_limit();

        let response = upload_route(
            uploader,
            dir.path(),
            Some(limit),
            form_request(&[file("file", "big.txt", &data)]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let uploaded: Vec<UploadedFile> = serde_json::from_slice(&body).unwrap();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].file_size, data.len() as u64);
    }

    #[tokio::test]
    async fn test_extractor_limit_reports_its_own_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![b'a'; 3 * 1024 * 1024];

        let response = upload_route(
            Uploader::default(),
            dir.path(),
            None,
            form_request(&[file("file", "big.txt", &data)]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope["error"], true);
        let message = envelope["message"].as_str().unwrap();
        assert!(!message.contains("1073741824"), "{message}");
    }

    #[tokio::test]
    async fn test_missing_upload_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let form = multipart(&[file("file", "a.txt", b"hello")]).await;

        let error = Uploader::default()
            .upload_files(form, dir.path().join("missing"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);
    }

    #[tokio::test]
    async fn test_custom_tokens_and_length() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolkitConfig::default().with_file_name_length(8);
        let tokens = RandomTokenGenerator::with_alphabet("xyz").unwrap();
        let form = multipart(&[file("file", "a.bin", b"\x00\x01\x02\x03")]).await;

        let uploaded = Uploader::new(&config)
            .with_tokens(tokens)
            .upload_file(form, dir.path())
            .await
            .unwrap();

        // Unknown binary data has no extension.
        assert_eq!(uploaded.new_file_name.len(), 8);
        assert!(uploaded.new_file_name.chars().all(|c| "xyz".contains(c)));
        assert_eq!(uploaded.content_type, "application/octet-stream");
    }

    #[test]
    fn test_uploaded_file_serializes_camel_case() {
        let file = UploadedFile {
            new_file_name: "abc.png".into(),
            original_file_name: "photo.txt".into(),
            file_size: 42,
            content_type: "image/png".into(),
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["newFileName"], "abc.png");
        assert_eq!(value["originalFileName"], "photo.txt");
        assert_eq!(value["fileSize"], 42);
    }
}
