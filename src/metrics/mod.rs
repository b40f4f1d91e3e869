/*!
 * # Metrics Module
 *
 * Prometheus metrics for the SGQ API, exposed in text format at `/metrics`.
 *
 * - HTTP request counts, latency and status classes (middleware)
 * - Registry counters registered by the commands (creations, failures)
 * - Session gauge fed from the auth session registry
 */

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        error!(error = %self, "metrics export failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

lazy_static! {
    /// Registry behind `/metrics`.
    pub static ref REGISTRY: Registry = Registry::new_custom(Some("sgq".into()), None)
        .expect("metrics registry can be created");

    static ref HTTP_REQUESTS: IntCounterVec = register(IntCounterVec::new(
        Opts::new("http_requests_total", "HTTP requests by method and status class"),
        &["method", "status"],
    ));

    static ref HTTP_LATENCY: HistogramVec = register(HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request latency"),
        &["method"],
    ));

    pub static ref ACTIVE_SESSIONS: IntGauge = register(IntGauge::new(
        "active_sessions",
        "Signed-in sessions currently tracked",
    ));
}

fn register<M>(metric: prometheus::Result<M>) -> M
where
    M: prometheus::core::Collector + Clone + 'static,
{
    let metric = metric.expect("metric can be created");
    if let Err(e) = REGISTRY.register(Box::new(metric.clone())) {
        warn!(error = %e, "metric registered twice");
    }
    metric
}

/// Creates and registers a counter. Meant for `lazy_static!` blocks.
pub fn int_counter(name: &str, help: &str) -> IntCounter {
    register(IntCounter::new(name, help))
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Records request count and latency for every response.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    HTTP_LATENCY
        .with_label_values(&[&method])
        .observe(started.elapsed().as_secs_f64());
    HTTP_REQUESTS
        .with_label_values(&[&method, status_class(response.status())])
        .inc();
    response
}

pub fn export_metrics() -> Result<String, MetricsError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| MetricsError::ExportError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| MetricsError::ExportError(e.to_string()))
}

// HTTP endpoint handler for metrics
pub async fn metrics_handler() -> Result<Response, MetricsError> {
    let body = export_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_counters_are_exported() {
        let counter = int_counter("test_things_total", "Things counted in tests");
        counter.inc();
        lazy_static::initialize(&ACTIVE_SESSIONS);

        let text = export_metrics().unwrap();
        assert!(text.contains("sgq_test_things_total 1"));
        assert!(text.contains("sgq_active_sessions"));
    }

    #[test]
    fn status_classes() {
        assert_eq!(status_class(StatusCode::CREATED), "2xx");
        assert_eq!(status_class(StatusCode::NOT_FOUND), "4xx");
        assert_eq!(status_class(StatusCode::BAD_GATEWAY), "5xx");
    }
}
