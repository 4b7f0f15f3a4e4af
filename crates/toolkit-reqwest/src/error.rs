//! Mapping of reqwest failures onto toolkit errors.

use toolkit_core::Error;

/// Converts a reqwest failure into a transport error.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    Error::transport(message).with_source(err)
}

/// Converts a JSON serialization failure into an encode error.
pub(crate) fn encode_error(err: serde_json::Error) -> Error {
    Error::encode(err.to_string()).with_source(err)
}
