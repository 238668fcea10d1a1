/*
 * Responsibility
 * - Global fixed-window rate limiter keyed by client IP
 * - Exceeding the window produces 429, distinguishable from auth failures
 */
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    body::Body, extract::State, http::Request, middleware::Next, response::Response,
};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Prune stale windows once the table grows past this many keys.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-process token table. The lock is held only for non-suspending
/// bookkeeping, never across an await point.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    limit: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            window,
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }
}

pub async fn enforce(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&req);

    if !state.rate_limiter.allow(&key) {
        warn!(client = %key, path = %req.uri().path(), "rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(req).await)
}

/// Client key for the window table. Proxy headers first; a shared fallback
/// key still bounds total throughput when no client address is known.
fn client_key(req: &Request<Body>) -> String {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = req.headers().get(header).and_then(|v| v.to_str().ok()) {
            if let Some(ip) = value.split(',').next().map(str::trim)
                && !ip.is_empty()
            {
                return ip.to_string();
            }
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_after_limit_within_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.2"));
    }

    #[test]
    fn window_resets_after_ttl() {
        let limiter = RateLimiter::new(Duration::from_millis(50), 1);
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        std::thread::sleep(Duration::from_millis(80));
        assert!(limiter.allow("10.0.0.1"));
    }
}
