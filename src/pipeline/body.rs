//! Request body capture and decoding.
//!
//! # Responsibilities
//! - Decide from `Content-Type` whether a body is parsed at all
//! - Read at most the configured number of bytes
//! - Decode JSON (strict: object or array) and URL-encoded bodies
//!
//! # Design Decisions
//! - A declared `Content-Length` above the limit is rejected before reading
//! - Bodies of other content types are left unread
//! - An empty body decodes to an empty object

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::pipeline::query::parse_urlencoded;

/// Body encodings the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    UrlEncoded,
}

impl BodyKind {
    /// Classify a request by its `Content-Type` header.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            Some(BodyKind::Json)
        } else if essence == "application/x-www-form-urlencoded" {
            Some(BodyKind::UrlEncoded)
        } else {
            None
        }
    }
}

/// Body bytes read from the wire, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawBody {
    pub kind: BodyKind,
    pub bytes: Bytes,
}

/// Read the body if its content type is parsed, enforcing `limit`.
pub async fn capture(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Option<RawBody>, AppError> {
    let Some(kind) = BodyKind::from_headers(headers) else {
        return Ok(None);
    };

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(AppError::payload_too_large());
    }

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        let inner = err.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            AppError::payload_too_large()
        } else {
            AppError::bad_request(format!("Failed to read request body: {inner}"))
        }
    })?;

    Ok(Some(RawBody { kind, bytes }))
}

/// Decode a captured body into a value tree.
pub fn decode(raw: &RawBody) -> Result<Value, AppError> {
    if raw.bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match raw.kind {
        BodyKind::Json => {
            let value: Value = serde_json::from_slice(&raw.bytes)
                .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {e}")))?;
            if value.is_object() || value.is_array() {
                Ok(value)
            } else {
                Err(AppError::bad_request(
                    "Invalid JSON body: expected an object or an array",
                ))
            }
        }
        BodyKind::UrlEncoded => {
            let text = std::str::from_utf8(&raw.bytes)
                .map_err(|_| AppError::bad_request("URL-encoded body is not valid UTF-8"))?;
            parse_urlencoded(text).map(Value::Object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::json;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    fn raw(kind: BodyKind, body: &str) -> RawBody {
        RawBody {
            kind,
            bytes: Bytes::copy_from_slice(body.as_bytes()),
        }
    }

    #[test]
    fn test_body_kind() {
        assert_eq!(
            BodyKind::from_headers(&headers("application/json; charset=utf-8")),
            Some(BodyKind::Json)
        );
        assert_eq!(
            BodyKind::from_headers(&headers("application/x-www-form-urlencoded")),
            Some(BodyKind::UrlEncoded)
        );
        assert_eq!(BodyKind::from_headers(&headers("text/plain")), None);
        assert_eq!(BodyKind::from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_decode_json() {
        let value = decode(&raw(BodyKind::Json, r#"{"name":"A"}"#)).unwrap();
        assert_eq!(value, json!({ "name": "A" }));
    }

    #[test]
    fn test_decode_rejects_scalars_and_garbage() {
        let err = decode(&raw(BodyKind::Json, "42")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = decode(&raw(BodyKind::Json, "{not json")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_decode_empty_is_object() {
        assert_eq!(decode(&raw(BodyKind::Json, "")).unwrap(), json!({}));
        assert_eq!(decode(&raw(BodyKind::UrlEncoded, "  ")).unwrap(), json!({}));
    }

    #[test]
    fn test_decode_urlencoded() {
        let value = decode(&raw(BodyKind::UrlEncoded, "name=A&email=a%40b.com")).unwrap();
        assert_eq!(value, json!({ "name": "A", "email": "a@b.com" }));
    }

    #[tokio::test]
    async fn test_capture_enforces_limit() {
        let body = Body::from("x".repeat(64));
        let err = capture(&headers("application/json"), body, 16).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_capture_rejects_declared_length() {
        let mut headers = headers("application/json");
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("100000"));
        let err = capture(&headers, Body::empty(), 1024).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_capture_skips_other_content_types() {
        let body = Body::from("x".repeat(64));
        assert!(capture(&headers("text/plain"), body, 16).await.unwrap().is_none());
    }
}
