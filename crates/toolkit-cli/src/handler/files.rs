//! Upload and download handlers.

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use toolkit_core::Result;
use toolkit_server::Toolkit;

use super::{Directories, TRACING_TARGET};

/// Query parameters of a download.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    /// Filename suggested to the client; defaults to the stored name.
    pub name: Option<String>,
}

/// Stores every file of a multipart form and lists them.
#[tracing::instrument(skip_all)]
pub async fn upload(
    State(toolkit): State<Toolkit>,
    State(dirs): State<Directories>,
    multipart: Multipart,
) -> Result<Response> {
    let files = toolkit.upload_files(multipart, dirs.upload_dir.as_path()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        file_count = files.len(),
        total_size = files.iter().map(|file| file.file_size).sum::<u64>(),
        "files uploaded"
    );

    toolkit.write_json(StatusCode::CREATED, &files, None)
}

/// Serves a file from the download directory as an attachment.
#[tracing::instrument(skip_all)]
pub async fn download(
    State(toolkit): State<Toolkit>,
    State(dirs): State<Directories>,
    Path(file): Path<String>,
    Query(query): Query<DownloadQuery>,
    request: Request,
) -> Response {
    let display_name = query.name.as_deref().unwrap_or(&file);
    toolkit
        .download_file(request, dirs.download_dir.as_path(), &file, display_name)
        .await
}

#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_DISPOSITION;
    use axum_test::multipart::{MultipartForm, Part};
    use toolkit_core::ToolkitConfig;
    use toolkit_server::UploadedFile;

    use crate::handler::test::create_test_app;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06";

    #[tokio::test]
    async fn upload_stores_files_under_sniffed_names() -> anyhow::Result<()> {
        let app = create_test_app(ToolkitConfig::default())?;

        let form = MultipartForm::new()
            .add_text("note", "ignored")
            .add_part(
                "files",
                Part::bytes(PNG.to_vec())
                    .file_name("photo.txt")
                    .mime_type("text/plain"),
            )
            .add_part(
                "files",
                Part::bytes(b"hello world".to_vec()).file_name("hello.bin"),
            );

        let response = app.server.post("/upload").multipart(form).await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let files: Vec<UploadedFile> = response.json();
        assert_eq!(files.len(), 2);
        assert!(files[0].new_file_name.ends_with(".png"));
        assert_eq!(files[0].original_file_name, "photo.txt");
        assert_eq!(files[0].file_size, PNG.len() as u64);
        assert!(files[1].new_file_name.ends_with(".txt"));

        for file in &files {
            assert!(app.upload_dir.path().join(&file.new_file_name).is_file());
        }
        Ok(())
    }

    #[tokio::test]
    async fn upload_rejects_oversized_form() -> anyhow::Result<()> {
        let app = create_test_app(ToolkitConfig::default().with_max_form_size(512))?;

        let form = MultipartForm::new()
            .add_part("file", Part::bytes(vec![b'a'; 4096]).file_name("big.txt"));

        let response = app.server.post("/upload").multipart(form).await;
        response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], true);
        Ok(())
    }

    #[tokio::test]
    async fn download_sets_attachment_name() -> anyhow::Result<()> {
        let app = create_test_app(ToolkitConfig::default())?;
        std::fs::write(app.download_dir.path().join("k3j2h1.pdf"), b"%PDF-1.7")?;

        let response = app
            .server
            .get("/download/k3j2h1.pdf")
            .add_query_param("name", "Quarterly Report.pdf")
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.header(CONTENT_DISPOSITION),
            "attachment; filename=\"Quarterly Report.pdf\""
        );
        assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.7");

        let response = app.server.get("/download/k3j2h1.pdf").await;
        assert_eq!(
            response.header(CONTENT_DISPOSITION),
            "attachment; filename=\"k3j2h1.pdf\""
        );
        Ok(())
    }

    #[tokio::test]
    async fn download_missing_file() -> anyhow::Result<()> {
        let app = create_test_app(ToolkitConfig::default())?;

        let response = app.server.get("/download/absent.txt").await;
        response.assert_status_not_found();
        Ok(())
    }
}
