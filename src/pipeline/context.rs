//! Per-request context built by the pipeline.
//!
//! Created when a request enters the pipeline, stored in the request
//! extensions once every stage has run, dropped with the request.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::pipeline::body::{self, BodyKind, RawBody};
use crate::pipeline::query::parse_urlencoded;

/// Request data as seen by route handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// ISO-8601 time the request passed the pipeline.
    pub request_time: Option<String>,
    /// Decoded, sanitized body. Empty object when there was none.
    pub body: Value,
    /// Decoded, sanitized query.
    pub query: Map<String, Value>,
    /// Original values of query keys the pollution guard collapsed.
    pub query_polluted: Map<String, Value>,
    /// Cookies sent with the request.
    pub cookies: BTreeMap<String, String>,

    pub(crate) raw_body: Option<RawBody>,
    pub(crate) body_kind: Option<BodyKind>,
    pub(crate) cookie_headers: HeaderMap,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            request_time: None,
            body: Value::Object(Map::new()),
            query: Map::new(),
            query_polluted: Map::new(),
            cookies: BTreeMap::new(),
            raw_body: None,
            body_kind: None,
            cookie_headers: HeaderMap::new(),
        }
    }
}

impl RequestContext {
    /// Capture what the stages need from an incoming request.
    ///
    /// Reads the body (bounded by `body_limit`) when its content type is one
    /// the pipeline parses, and decodes the query string.
    pub async fn capture(parts: &Parts, body: Body, body_limit: usize) -> Result<Self, AppError> {
        let query = match parts.uri.query() {
            Some(raw) => parse_urlencoded(raw)?,
            None => Map::new(),
        };

        let raw_body = body::capture(&parts.headers, body, body_limit).await?;

        let mut cookie_headers = HeaderMap::new();
        for value in parts.headers.get_all(header::COOKIE) {
            cookie_headers.append(header::COOKIE, value.clone());
        }

        Ok(Self {
            query,
            raw_body,
            cookie_headers,
            ..Self::default()
        })
    }

    /// Context for tests and internal callers that already hold decoded data.
    pub fn from_parts(query: Map<String, Value>, body: Value) -> Self {
        Self {
            query,
            body,
            ..Self::default()
        }
    }

    /// Look up a top-level body field as a string.
    pub fn body_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// True when the body arrived as `application/x-www-form-urlencoded`.
    pub fn body_was_urlencoded(&self) -> bool {
        self.body_kind == Some(BodyKind::UrlEncoded)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::unexpected("request context missing; pipeline not installed"))
    }
}
