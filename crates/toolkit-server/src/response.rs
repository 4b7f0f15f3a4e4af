//! JSON error replies.

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::Response;
use toolkit_core::{JsonResponse, Result};

use crate::codec::write_json;

/// Status used by [`error_json`] when none is given.
pub const DEFAULT_ERROR_STATUS: StatusCode = StatusCode::BAD_REQUEST;

/// Replies with `{"error":true,"message":"<error>"}`.
///
/// The status defaults to `400 Bad Request`.
///
/// # Errors
///
/// Returns whatever [`write_json`] returns.
pub fn error_json<E>(error: &E, status: Option<StatusCode>) -> Result<Response>
where
    E: Display + ?Sized,
{
    let payload = JsonResponse::error(error.to_string());
    write_json(status.unwrap_or(DEFAULT_ERROR_STATUS), &payload, None)
}

#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_TYPE;
    use toolkit_core::Error;

    use super::*;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_default_status_and_exact_body() {
        let response = error_json("bad input", None).unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_string(response).await,
            r#"{"error":true,"message":"bad input"}"#
        );
    }

    #[tokio::test]
    async fn test_explicit_status() {
        let error = Error::io("disk full");
        let response = error_json(&error, Some(StatusCode::INTERNAL_SERVER_ERROR)).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":true,"message":"disk full"}"#
        );
    }
}
