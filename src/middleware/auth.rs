/*
 * Responsibility
 * - Authentication gate: public-route bypass, Bearer extraction, remote
 *   token verification, Identity into request extensions
 * - Every failure kind maps to 401; provider detail stays in the log
 */
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::routes::RouteVisibility;
use crate::state::AppState;

/// Bound on the verification round-trip so a slow identity provider cannot
/// hold a request open indefinitely. Expiry counts as an invalid token.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if state.routes.visibility(path) == RouteVisibility::Public {
        return Ok(next.run(req).await);
    }

    let Some(header) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        warn!(path, "missing authorization header");
        return Err(AppError::MissingAuthHeader);
    };

    let Some(token) = parse_bearer(header) else {
        warn!(path, "invalid authorization format");
        return Err(AppError::MalformedAuthHeader);
    };

    let identity = match timeout(VERIFY_TIMEOUT, state.supabase.get_user(token)).await {
        Ok(Ok(identity)) => identity,
        Ok(Err(e)) => {
            warn!(path, error = %e, "token verification failed");
            return Err(AppError::InvalidToken {
                reason: e.to_string(),
            });
        }
        Err(_) => {
            warn!(path, "token verification timed out");
            return Err(AppError::InvalidToken {
                reason: format!("verification timed out after {VERIFY_TIMEOUT:?}"),
            });
        }
    };

    debug!(path, user_id = %identity.id, "authenticated");

    // Visible to handlers and to error logging for the rest of this request.
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Accepts exactly `Bearer <token>`: one space, non-empty single-word token.
fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes_and_shapes() {
        assert_eq!(parse_bearer("Token abc"), None);
        assert_eq!(parse_bearer("bearer abc"), None);
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer  abc"), None);
        assert_eq!(parse_bearer("Bearer abc def"), None);
    }
}
