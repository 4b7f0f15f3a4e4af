//! JSON push to remote endpoints.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use toolkit_core::Result;

use crate::TRACING_TARGET;
use crate::error::{encode_error, transport_error};

/// Serializes `data` as JSON indented with one tab per level.
///
/// # Errors
///
/// Returns [`ErrorKind::Encode`](toolkit_core::ErrorKind::Encode) if `data`
/// cannot be serialized.
pub fn encode_indented<T>(data: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut serializer).map_err(encode_error)?;
    Ok(buf)
}

/// POSTs `data` to `url` as tab-indented JSON and returns the remote status.
///
/// Any status the remote answers with, including `4xx` and `5xx`, is
/// returned as `Ok`. The response body is dropped unread. Timeouts are
/// whatever `client` was configured with.
///
/// # Errors
///
/// - [`ErrorKind::Encode`] if `data` cannot be serialized; nothing is sent.
/// - [`ErrorKind::Transport`] if the request cannot be built or sent, or no
///   response arrives.
///
/// [`ErrorKind::Encode`]: toolkit_core::ErrorKind::Encode
/// [`ErrorKind::Transport`]: toolkit_core::ErrorKind::Transport
pub async fn push_json_to_remote<T>(client: &Client, url: &str, data: &T) -> Result<StatusCode>
where
    T: Serialize + ?Sized,
{
    let body = encode_indented(data)?;

    tracing::debug!(
        target: TRACING_TARGET,
        url,
        size = body.len(),
        "pushing json to remote"
    );

    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                url,
                "failed to push json to remote"
            );
            transport_error(err)
        })?;

    let status = response.status();
    tracing::debug!(
        target: TRACING_TARGET,
        url,
        status = status.as_u16(),
        "remote answered push"
    );

    Ok(status)
}
