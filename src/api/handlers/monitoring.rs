/*
 * Responsibility
 * - GET /monitoring/metrics: Prometheus text exposition
 * - GET /monitoring/stats: JSON process stats (separate read path, not
 *   routed through the request instruments)
 */
use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::AppError;
use crate::services::monitoring::ProcessStats;
use crate::state::AppState;

pub async fn metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let text = state.metrics.render().map_err(|e| {
        error!(error = %e, "failed to render metrics");
        AppError::downstream("Failed to render metrics", e.to_string())
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}

pub async fn stats(State(state): State<AppState>) -> Json<ProcessStats> {
    Json(ProcessStats::collect(state.metrics.uptime_seconds()))
}
