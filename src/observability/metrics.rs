//! Call metrics.
//!
//! # Metrics
//! - `rest_calls_total` (counter): calls by method, outcome
//! - `rest_call_duration_seconds` (histogram): end-to-end latency by method
//! - `rest_transport_retries_total` (counter): extra attempts by method
//!
//! Outcomes are `success`, `configuration_error`, `transport_error` and
//! `decode_error`.

use std::time::Instant;

use metrics::{counter, histogram};

use crate::http::HttpMethod;

/// Record one finished call.
pub fn record_call(method: HttpMethod, outcome: &'static str, start: Instant) {
    counter!("rest_calls_total", "method" => method.as_str(), "outcome" => outcome).increment(1);
    histogram!("rest_call_duration_seconds", "method" => method.as_str())
        .record(start.elapsed().as_secs_f64());
}

/// Record one retried attempt.
pub fn record_retry(method: &str) {
    counter!("rest_transport_retries_total", "method" => method.to_string()).increment(1);
}
