//! Fallback and global error handling.
//!
//! # Responsibilities
//! - Turn unmatched routes into an operational 404
//! - Convert panics into unexpected errors
//! - Render every `ErrorReport` as JSON or as the error view
//!
//! # Design Decisions
//! - This is the only place an error body is produced
//! - Unexpected errors are logged with their real cause, then masked
//! - Headers already set on the failing response (rate-limit counters,
//!   request id) are kept

use std::any::Any;

use axum::extract::{OriginalUri, Request};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::{BoxError, Json};
use tower::timeout::error::Elapsed;

use crate::error::{AppError, ErrorBody, ErrorReport};
use crate::observability::metrics;
use crate::templates;

pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Shape of an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Html,
}

impl ResponseFormat {
    /// API paths always get JSON. Elsewhere JSON is sent only to clients
    /// that accept it and do not accept HTML.
    pub fn negotiate(path: &str, headers: &HeaderMap) -> Self {
        if path.starts_with("/api") {
            return Self::Json;
        }
        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if accept.contains("application/json") && !accept.contains("text/html") {
            Self::Json
        } else {
            Self::Html
        }
    }
}

/// Fallback for requests no route group claimed.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    let original_url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    AppError::route_not_found(original_url)
}

/// Panic hook for `CatchPanicLayer`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic type".to_owned()
    };
    AppError::unexpected(format!("handler panicked: {detail}")).into_response()
}

/// Error hook for the request timeout.
pub async fn handle_timeout(error: BoxError) -> AppError {
    if error.is::<Elapsed>() {
        AppError::operational(StatusCode::REQUEST_TIMEOUT, TIMEOUT_MESSAGE)
    } else {
        AppError::unexpected(error)
    }
}

/// Middleware rendering any error produced further down the chain.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let format = ResponseFormat::negotiate(request.uri().path(), request.headers());
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    match response.extensions().get::<ErrorReport>().cloned() {
        Some(ErrorReport(error)) => render(&error, format, &method, &uri, response),
        None => response,
    }
}

fn render(
    error: &AppError,
    format: ResponseFormat,
    method: &Method,
    uri: &Uri,
    failed: Response,
) -> Response {
    if error.is_operational() {
        tracing::debug!(
            method = %method,
            uri = %uri,
            status = error.status().as_u16(),
            message = error.client_message(),
            "Operational error"
        );
    } else {
        tracing::error!(method = %method, uri = %uri, error = ?error, "Unexpected error");
    }
    metrics::record_error(error.kind());

    let mut rendered = match format {
        ResponseFormat::Json => Json(ErrorBody::from_error(error)).into_response(),
        ResponseFormat::Html => Html(templates::error_page(error.client_message())).into_response(),
    };
    *rendered.status_mut() = error.status();

    let (parts, _) = failed.into_parts();
    let headers = rendered.headers_mut();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH && !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_negotiate() {
        assert_eq!(ResponseFormat::negotiate("/api/v1/tours", &HeaderMap::new()), ResponseFormat::Json);
        assert_eq!(ResponseFormat::negotiate("/api", &accept("text/html")), ResponseFormat::Json);
        assert_eq!(ResponseFormat::negotiate("/nope", &HeaderMap::new()), ResponseFormat::Html);
        assert_eq!(
            ResponseFormat::negotiate("/nope", &accept("application/json")),
            ResponseFormat::Json
        );
        assert_eq!(
            ResponseFormat::negotiate("/nope", &accept("text/html,application/json;q=0.9")),
            ResponseFormat::Html
        );
    }

    #[test]
    fn test_render_keeps_headers() {
        let mut failed = AppError::bad_request("bad").into_response();
        failed
            .headers_mut()
            .insert("x-ratelimit-remaining", HeaderValue::from_static("42"));

        let error = AppError::bad_request("bad");
        let response = render(
            &error,
            ResponseFormat::Json,
            &Method::GET,
            &Uri::from_static("/api/v1/tours"),
            failed,
        );

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "42");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_panic_becomes_unexpected() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert!(!report.0.is_operational());
        assert!(report.0.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_timeout_is_operational() {
        let error = handle_timeout(Box::new(Elapsed::new())).await;
        assert_eq!(error.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(error.client_message(), TIMEOUT_MESSAGE);

        let error = handle_timeout("connection reset".into()).await;
        assert!(!error.is_operational());
    }
}
