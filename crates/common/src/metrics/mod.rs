//! Metrics and observability utilities
//!
//! Counters and histograms for graph requests and traversal progress with
//! standardized naming. Nothing is exported unless the host installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all editorscout metrics
pub const METRICS_PREFIX: &str = "editorscout";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_graph_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of graph service requests"
    );

    describe_histogram!(
        format!("{}_graph_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Graph service request latency in seconds"
    );

    describe_counter!(
        format!("{}_rate_limited_total", METRICS_PREFIX),
        Unit::Count,
        "Responses rejected with 429 Too Many Requests"
    );

    describe_histogram!(
        format!("{}_backoff_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Backoff sleeps taken after rate-limited responses"
    );

    describe_counter!(
        format!("{}_papers_visited_total", METRICS_PREFIX),
        Unit::Count,
        "Papers discovered by the citation traversal"
    );

    describe_counter!(
        format!("{}_editor_matches_total", METRICS_PREFIX),
        Unit::Count,
        "Editor matches recorded by the citation traversal"
    );
}

/// Timer for one graph request
pub struct RequestTimer {
    start: Instant,
    endpoint: &'static str,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Record the request with its final status code
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();
        let status = status.to_string();

        counter!(
            format!("{}_graph_requests_total", METRICS_PREFIX),
            "endpoint" => self.endpoint,
            "status" => status
        )
        .increment(1);

        histogram!(
            format!("{}_graph_request_duration_seconds", METRICS_PREFIX),
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a 429 response and the backoff taken for it
pub fn record_rate_limited(backoff_secs: Option<f64>) {
    counter!(format!("{}_rate_limited_total", METRICS_PREFIX)).increment(1);
    if let Some(secs) = backoff_secs {
        histogram!(format!("{}_backoff_seconds", METRICS_PREFIX)).record(secs);
    }
}

/// Record newly visited papers
pub fn record_papers_visited(count: usize) {
    counter!(format!("{}_papers_visited_total", METRICS_PREFIX)).increment(count as u64);
}

/// Record one editor match
pub fn record_editor_match() {
    counter!(format!("{}_editor_matches_total", METRICS_PREFIX)).increment(1);
}
