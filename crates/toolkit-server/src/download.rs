//! File downloads as attachments.

use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Tracing target for download operations.
pub const TRACING_TARGET: &str = "toolkit_server::download";

/// Serves `file` from `base` so that clients save it as `display_name`.
///
/// The file is streamed by [`ServeFile`], which answers range and
/// conditional requests and writes its own `404`/`500` responses for
/// missing or unreadable files. Successful responses carry
/// `Content-Disposition: attachment; filename="<display_name>"`.
///
/// Only the normal components of `file` are joined to `base`: leading
/// separators, `.` and `..` are dropped, so the result never leaves `base`.
#[tracing::instrument(skip_all, fields(file = %file))]
pub async fn download_file(
    request: Request,
    base: impl AsRef<Path>,
    file: &str,
    display_name: &str,
) -> Response {
    let path = join_relative(base.as_ref(), file);

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };

    let (mut parts, body) = response.into_parts();
    if parts.status.is_success() {
        parts
            .headers
            .insert(CONTENT_DISPOSITION, attachment_disposition(display_name));

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            display_name,
            status = %parts.status,
            "serving file download"
        );
    } else {
        tracing::warn!(
            target: TRACING_TARGET,
            path = %path.display(),
            status = %parts.status,
            "file download not served"
        );
    }

    Response::from_parts(parts, body)
}

fn join_relative(base: &Path, file: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for component in Path::new(file).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}

/// Builds the attachment header, adding an RFC 5987 `filename*` for
/// non-ASCII names.
fn attachment_disposition(display_name: &str) -> HeaderValue {
    let mut ascii = String::with_capacity(display_name.len());
    for c in display_name.chars() {
        match c {
            '"' | '\\' => {
                ascii.push('\\');
                ascii.push(c);
            }
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => ascii.push(c),
            _ => ascii.push('_'),
        }
    }

    let mut value = format!("attachment; filename=\"{ascii}\"");
    if !display_name.is_ascii() {
        value.push_str("; filename*=UTF-8''");
        for byte in display_name.bytes() {
            if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
                value.push(char::from(byte));
            } else {
                let _ = write!(value, "%{byte:02X}");
            }
        }
    }

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
