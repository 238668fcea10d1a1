/*
 * Responsibility
 * - Config load -> tracing init -> shared state -> Router assembly
 * - Middleware layering (the whole request pipeline is wired here)
 * - axum::serve startup
 */
use std::time::Duration;

use anyhow::Result;
use axum::{Router, middleware as axum_middleware};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::middleware;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::{monitoring::Metrics, supabase::SupabaseClient};
use crate::api;
use crate::state::AppState;

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let supabase = SupabaseClient::new(&config)?;
    let metrics = Metrics::new()?;
    let rate_limiter = RateLimiter::new(
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_max_requests,
    );

    let addr = config.addr;
    let state = AppState::new(config, supabase, metrics, rate_limiter);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Full pipeline, inner to outer: routes -> auth gate -> rate limit ->
/// transport limits -> error envelope -> CORS -> security headers ->
/// request observer -> request-id + trace.
///
/// The observer is the outermost functional layer so it sees the final
/// status of every exit path; the normalizer sits inside it so rejected and
/// errored requests are observed in their enveloped form.
pub fn build_router(state: AppState) -> Router {
    let app = api::routes()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::enforce,
        ))
        .with_state(state.clone());

    let app = middleware::http::apply_limits(app);
    let app = app.layer(axum_middleware::from_fn(
        middleware::error_normalizer::normalize,
    ));
    let app = middleware::cors::apply(app, &state.config);
    let app = middleware::security_headers::apply(app);
    let app = app.layer(axum_middleware::from_fn_with_state(
        state,
        middleware::metrics::observe,
    ));
    middleware::http::apply(app)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
