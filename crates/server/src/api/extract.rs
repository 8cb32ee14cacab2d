//! Request body extraction that reports failures as [`ApiError`] JSON bodies.

use crate::error::ApiError;
use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// JSON request body.
///
/// A missing or whitespace-only body is read as `T::default()`, so the handler's own validation
/// decides what is required. The body is parsed as JSON whatever the `Content-Type` says;
/// malformed or mistyped JSON is a `400`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to buffer request body");
            ApiError::bad_request("Invalid request body").with_detail(e.body_text())
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(JsonBody(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Body {
        #[serde(default)]
        name: Option<String>,
    }

    async fn extract(body: &'static str) -> Result<Body, ApiError> {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(axum::body::Body::from(body))
            .unwrap();
        JsonBody::<Body>::from_request(req, &()).await.map(|b| b.0)
    }

    #[tokio::test]
    async fn empty_body_is_default() {
        assert_eq!(extract("").await.unwrap(), Body::default());
        assert_eq!(extract(" \n").await.unwrap(), Body::default());
    }

    #[tokio::test]
    async fn parses_without_content_type() {
        let body = extract(r#"{"name":"Kamal"}"#).await.unwrap();
        assert_eq!(body.name.as_deref(), Some("Kamal"));
    }

    #[tokio::test]
    async fn bad_json_is_bad_request() {
        for raw in ["{not json", r#"{"name": 5}"#] {
            let err = extract(raw).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.body.message, "Invalid request body");
            assert!(err.body.error.is_some());
        }
    }
}
