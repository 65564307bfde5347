// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Opens one span per HTTP request carrying a generated request ID

use http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

/// Builds the per-request span
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            request_id = %format!("req_{}", Uuid::new_v4().simple()),
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}

/// `TraceLayer` that logs each response at INFO inside a request span
#[must_use]
pub fn http_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
