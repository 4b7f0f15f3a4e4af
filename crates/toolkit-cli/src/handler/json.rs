//! JSON echo and push handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolkit_core::{JsonResponse, Result, ResultExt};
use toolkit_reqwest::ReqwestPusher;
use toolkit_server::{StrictJson, Toolkit};

use super::{PushTargets, TRACING_TARGET};

/// Body of a push request.
#[derive(Debug, Serialize, Deserialize)]
pub struct PushRequest {
    /// Remote endpoint receiving the payload.
    pub url: String,
    /// Payload forwarded as tab-indented JSON.
    pub data: Value,
}

/// Decodes exactly one JSON value and sends it back.
#[tracing::instrument(skip_all)]
pub async fn echo(StrictJson(value): StrictJson<Value>) -> StrictJson<Value> {
    tracing::debug!(target: TRACING_TARGET, "echoing json body");
    StrictJson(value)
}

/// Pushes `data` to `url` and replies with the remote status.
///
/// Only hosts listed in [`PushTargets`] are reached; others get 403.
#[tracing::instrument(skip_all)]
pub async fn push(
    State(toolkit): State<Toolkit>,
    State(pusher): State<ReqwestPusher>,
    State(targets): State<PushTargets>,
    StrictJson(request): StrictJson<PushRequest>,
) -> Result<Response> {
    if !targets.allows(&request.url) {
        tracing::warn!(target: TRACING_TARGET, url = %request.url, "push target refused");
        return toolkit.error_json("push target is not allowed", Some(StatusCode::FORBIDDEN));
    }

    let status = pusher
        .push_json(&request.url, &request.data)
        .await
        .log_err()?;

    tracing::info!(
        target: TRACING_TARGET,
        url = %request.url,
        status = status.as_u16(),
        "payload pushed"
    );

    let reply = JsonResponse::success(format!("remote answered {status}"))
        .with_data(serde_json::json!({ "status": status.as_u16() }));
    toolkit.write_json(StatusCode::ACCEPTED, &reply, None)
}
