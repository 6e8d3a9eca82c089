//! Request ids and the development request logger.

use std::time::Duration;

use axum::http::{header, Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::Span;

/// Assigns `x-request-id` to requests that lack one.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copies `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Span carrying method, URI and request id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevSpan;

impl<B> MakeSpan<B> for DevSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// One line per response: status, latency, content length.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevLogLine;

impl<B> OnResponse<B> for DevLogLine {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let content_length = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = latency.as_millis() as u64,
            content_length,
            "response"
        );
    }
}

pub type DevTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, DevSpan, DefaultOnRequest, DevLogLine>;

/// Request logger registered only in development mode.
pub fn dev_trace_layer() -> DevTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(DevSpan)
        .on_response(DevLogLine)
}
