//! Tracing extensions
//!
//! A `RequestSpan` wraps one generation attempt so that every event emitted
//! while it is entered (adapter debug logs, the structured request record,
//! rate-limit warnings) carries the correlation ids.

use std::time::{Duration, Instant};
use tracing::{info_span, Span};

/// Span covering one generation attempt
#[derive(Debug)]
pub struct RequestSpan {
    span: Span,
    start: Instant,
    request_id: String,
}

impl RequestSpan {
    pub fn new(
        request_id: &str,
        client_request_id: Option<&str>,
        model_key: &str,
        provider: &str,
        attempt: u8,
    ) -> Self {
        let span = info_span!(
            "generation",
            request_id = %request_id,
            client_request_id = client_request_id.unwrap_or(""),
            model = %model_key,
            provider = %provider,
            attempt = attempt,
            success = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            input_tokens = tracing::field::Empty,
            output_tokens = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            request_id: request_id.to_string(),
        }
    }

    /// Get the underlying span
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_outcome(&self, success: bool) {
        self.span.record("success", success);
    }

    /// Record token counts
    pub fn record_tokens(&self, input: u32, output: u32) {
        self.span.record("input_tokens", input);
        self.span.record("output_tokens", output);
    }

    /// Record latency so far
    pub fn record_latency(&self) {
        self.span.record("latency_ms", self.start.elapsed().as_millis() as u64);
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
