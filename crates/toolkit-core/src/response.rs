//! JSON response envelope.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// Envelope for error and status replies.
///
/// `data` is omitted from the wire when absent, so an error reply is exactly
/// `{"error":true,"message":"..."}`.
#[must_use = "responses do nothing unless serialized"]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse<'a> {
    /// Whether the reply reports a failure.
    pub error: bool,
    /// Human-readable message.
    pub message: Cow<'a, str>,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl<'a> JsonResponse<'a> {
    /// Creates an error envelope with the given message.
    pub fn error(message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a success envelope with the given message.
    pub fn success(message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches a payload to the envelope.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<&Error> for JsonResponse<'static> {
    fn from(error: &Error) -> Self {
        Self::error(error.to_string())
    }
}

#[cfg(feature = "axum")]
mod axum_impl {
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};

    use super::JsonResponse;
    use crate::Error;

    impl IntoResponse for JsonResponse<'_> {
        fn into_response(self) -> Response {
            let status = if self.error {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::OK
            };
            (status, Json(self)).into_response()
        }
    }

    impl IntoResponse for Error {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.kind().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(JsonResponse::from(&self))).into_response()
        }
    }
}
