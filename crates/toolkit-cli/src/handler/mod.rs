//! Routes exercising every toolkit helper.

mod files;
mod json;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use toolkit_reqwest::ReqwestPusher;
use toolkit_server::{Toolkit, error_json};

/// Tracing target for request handlers.
pub const TRACING_TARGET: &str = "toolkit_cli::handler";

/// Directories the file routes read from and write to.
#[derive(Debug, Clone)]
pub struct Directories {
    pub upload_dir: Arc<PathBuf>,
    pub download_dir: Arc<PathBuf>,
}

/// Hosts the push route is allowed to reach.
#[derive(Debug, Clone, Default)]
pub struct PushTargets(Arc<[String]>);

impl PushTargets {
    pub fn new(hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(hosts.into_iter().map(Into::into).collect())
    }

    /// Returns whether `url` is an http(s) URL whose host is allowed.
    pub fn allows(&self, url: &str) -> bool {
        let Ok(uri) = url.parse::<Uri>() else {
            return false;
        };
        let http = matches!(uri.scheme_str(), Some("http" | "https"));
        let Some(host) = uri.host() else {
            return false;
        };
        http && self.0.iter().any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}

/// Shared router state.
#[derive(Debug, Clone)]
pub struct AppState {
    toolkit: Toolkit,
    pusher: ReqwestPusher,
    dirs: Directories,
    push_targets: PushTargets,
}

impl AppState {
    /// Creates the router state.
    pub fn new(
        toolkit: Toolkit,
        pusher: ReqwestPusher,
        upload_dir: impl Into<PathBuf>,
        download_dir: impl Into<PathBuf>,
        push_targets: PushTargets,
    ) -> Self {
        Self {
            toolkit,
            pusher,
            dirs: Directories {
                upload_dir: Arc::new(upload_dir.into()),
                download_dir: Arc::new(download_dir.into()),
            },
            push_targets,
        }
    }

    /// Returns the request helpers.
    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<AppState> for $t {
            fn from_ref(state: &AppState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(toolkit: Toolkit);
impl_di!(pusher: ReqwestPusher);
impl_di!(dirs: Directories);
impl_di!(push_targets: PushTargets);

#[inline]
async fn fallback() -> Response {
    error_json("route not found", Some(StatusCode::NOT_FOUND)).into_response()
}

/// Returns the application router.
pub fn routes(state: AppState) -> Router {
    let form_limit = state.toolkit.uploader().body_limit();

    Router::new()
        .route("/echo", post(json::echo))
        .route("/push", post(json::push))
        .route("/upload", post(files::upload).layer(form_limit))
        .route("/download/{file}", get(files::download))
        .fallback(fallback)
        .with_state(state)
}
