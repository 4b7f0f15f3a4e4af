//! Strict JSON decoding and JSON response encoding.
//!
//! Decoding reads the request body under a byte ceiling and accepts exactly
//! one JSON value: anything other than whitespace after the first value
//! (a second value, JSON lines, trailing garbage) is rejected with
//! [`ErrorKind::MultipleJsonValues`].
//!
//! [`ErrorKind::MultipleJsonValues`]: toolkit_core::ErrorKind::MultipleJsonValues

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use toolkit_core::{DEFAULT_MAX_FILE_SIZE, Error, Result};

/// Tracing target for JSON codec operations.
pub const TRACING_TARGET: &str = "toolkit_server::codec";

/// Media type set on every JSON response.
pub const APPLICATION_JSON: &str = "application/json";

/// Reads `body` and decodes exactly one JSON value from it.
///
/// The body is read chunk by chunk and rejected with a payload-too-large
/// error as soon as more than `max_bytes` arrive (`0` selects the 1 MiB
/// default), so oversized bodies are never fully buffered.
///
/// # Errors
///
/// - [`ErrorKind::PayloadTooLarge`] if the body exceeds the limit.
/// - [`ErrorKind::Decode`] if the body is empty, malformed or does not
///   match `T`; the message is the parser's own.
/// - [`ErrorKind::MultipleJsonValues`] if anything follows the first value.
///
/// [`ErrorKind::PayloadTooLarge`]: toolkit_core::ErrorKind::PayloadTooLarge
/// [`ErrorKind::Decode`]: toolkit_core::ErrorKind::Decode
/// [`ErrorKind::MultipleJsonValues`]: toolkit_core::ErrorKind::MultipleJsonValues
pub async fn read_json<T>(body: Body, max_bytes: usize) -> Result<T>
where
    T: DeserializeOwned,
{
    let limit = if max_bytes == 0 {
        DEFAULT_MAX_FILE_SIZE
    } else {
        max_bytes
    };

    let data = read_limited(body, limit).await?;
    decode_json_slice(&data)
}

/// Decodes exactly one JSON value from `data`.
///
/// # Errors
///
/// Same as [`read_json`], minus the size limit.
pub fn decode_json_slice<T>(data: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_slice(data);

    let value = T::deserialize(&mut deserializer)
        .map_err(|err| Error::decode(err.to_string()).with_source(err))?;

    // Only whitespace may follow the first value.
    deserializer.end().map_err(|err| {
        tracing::debug!(
            target: TRACING_TARGET,
            error = %err,
            "rejected body with trailing content"
        );
        Error::multiple_json_values().with_source(err)
    })?;

    Ok(value)
}

async fn read_limited(body: Body, limit: usize) -> Result<Vec<u8>> {
    let mut stream = body.into_data_stream();
    let mut data = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| Error::decode(err.to_string()).with_source(err))?;

        // Check size before adding chunk to avoid buffering past the limit
        if data.len() + chunk.len() > limit {
            tracing::debug!(
                target: TRACING_TARGET,
                limit,
                received = data.len() + chunk.len(),
                "request body exceeds limit"
            );
            return Err(Error::payload_too_large(limit));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

/// Encodes `data` into a JSON response with the given status.
///
/// Every header in `headers` replaces all values of the same name in the
/// response. `Content-Type` is then always set to `application/json`.
///
/// # Errors
///
/// Returns [`ErrorKind::Encode`] if `data` cannot be serialized; no response
/// is built in that case.
///
/// [`ErrorKind::Encode`]: toolkit_core::ErrorKind::Encode
pub fn write_json<T>(status: StatusCode, data: &T, headers: Option<&HeaderMap>) -> Result<Response>
where
    T: Serialize + ?Sized,
{
    let body =
        serde_json::to_vec(data).map_err(|err| Error::encode(err.to_string()).with_source(err))?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    if let Some(headers) = headers {
        merge_headers(response.headers_mut(), headers);
    }

    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

    Ok(response)
}

fn merge_headers(target: &mut HeaderMap, source: &HeaderMap) {
    for name in source.keys() {
        target.remove(name);
        for value in source.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}
