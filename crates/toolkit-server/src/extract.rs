//! Strict JSON extractor.

use axum::extract::{FromRef, FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;
use toolkit_core::Error;

use crate::Toolkit;
use crate::codec::{read_json, write_json};

/// JSON extractor that accepts exactly one value under the body limit.
///
/// Unlike [`axum::Json`], the `Content-Type` header is not checked and
/// trailing content after the value is rejected. The limit comes from the
/// [`Toolkit`] in the router state, which must implement
/// [`FromRef`] for the state type.
///
/// Rejections are [`Error`]s and answer with the error envelope.
///
/// As a response, the value is encoded with status `200 OK`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct StrictJson<T>(pub T);

impl<T> StrictJson<T> {
    /// Creates a new [`StrictJson`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    Toolkit: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let toolkit = Toolkit::from_ref(state);
        toolkit.read_json(req.into_body()).await.map(Self)
    }
}

impl<T> IntoResponse for StrictJson<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match write_json(StatusCode::OK, &self.0, None) {
            Ok(response) => response,
            Err(error) => error.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use serde_json::{Value, json};
    use toolkit_core::{ErrorKind, ToolkitConfig};

    use super::*;

    fn post(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_single_value() {
        let toolkit = Toolkit::default();
        let StrictJson(value) = StrictJson::<Value>::from_request(post(r#"{"a":1}"#), &toolkit)
            .await
            .unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_rejects_multiple_values() {
        let toolkit = Toolkit::default();
        let error = StrictJson::<Value>::from_request(post(r#"{"a":1}{"b":2}"#), &toolkit)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MultipleJsonValues);
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_uses_state_limit() {
        let toolkit = Toolkit::new(ToolkitConfig::default().with_max_file_size(4)).unwrap();
        let error = StrictJson::<Value>::from_request(post(r#"{"a":1}"#), &toolkit)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::PayloadTooLarge);
        assert_eq!(error.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_into_response_is_json() {
        let response = StrictJson(json!({"ok": true})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"ok":true}"#);
    }
}
