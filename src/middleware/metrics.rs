/*
 * Responsibility
 * - Request observer: one histogram observation + counter increment per
 *   request, on every exit path (handler, auth rejection, error envelope)
 * - Access log line, suppressed for health/metrics noise
 */
use std::time::Instant;

use axum::{
    body::Body, extract::State, http::Request, middleware::Next, response::Response,
};
use tracing::info;

use crate::services::monitoring::MetricSample;
use crate::state::AppState;

pub async fn observe(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    // Declared template, never the raw URL: dynamic path segments must not
    // mint new label values.
    let route = state.routes.template(&raw_path);

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    // Recording failures are logged and swallowed inside `record`; the
    // response already heading to the caller is never affected.
    state.metrics.record(&MetricSample {
        method: method.clone(),
        route,
        status_code: status,
        duration_seconds: elapsed.as_secs_f64(),
    });

    if !is_noise(&raw_path) {
        info!("{} {} {} {}ms", method, raw_path, status, elapsed.as_millis());
    }

    response
}

/// Paths that get numeric metrics but no per-request log line.
fn is_noise(path: &str) -> bool {
    path.starts_with("/health") || path == "/monitoring/metrics"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_and_metrics_are_noise() {
        assert!(is_noise("/health/live"));
        assert!(is_noise("/health/ready"));
        assert!(is_noise("/monitoring/metrics"));
        assert!(!is_noise("/monitoring/stats"));
        assert!(!is_noise("/api/profile"));
    }
}
