/*
 * Responsibility
 * - Single point where every failure becomes the canonical error envelope
 *   {statusCode, message, details, timestamp, path}
 * - Logs method/path/status/message: error for >=500, warn below
 */
use axum::{
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use crate::error::{ErrorEnvelope, ErrorParts};

/// Cap when reading a foreign error body (extractor rejections, fallbacks).
const MAX_FOREIGN_BODY: usize = 64 * 1024;

pub async fn normalize(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    let (message, details, internal) = match parts.extensions.remove::<ErrorParts>() {
        Some(app) => (app.message, app.details, app.internal),
        None => foreign_parts(status, body).await,
    };

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            detail = internal.as_deref().unwrap_or(""),
            "{message}"
        );
    } else {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "{message}"
        );
    }

    let envelope = ErrorEnvelope::new(status, message, details, &path);
    let bytes = serde_json::to_vec(&envelope).unwrap_or_else(|_| b"{}".to_vec());

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(bytes))
}

/// A failure that did not come through AppError: axum extractor rejections,
/// the 404/405 fallbacks, middleware-produced statuses. The body text is the
/// best available message for 4xx; 5xx always get the generic message with
/// the original text kept for the log.
async fn foreign_parts(
    status: axum::http::StatusCode,
    body: Body,
) -> (String, Option<String>, Option<String>) {
    let text = match axum::body::to_bytes(body, MAX_FOREIGN_BODY).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };

    let canonical = status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string();

    if status.is_server_error() {
        let internal = (!text.is_empty()).then_some(text);
        ("Internal server error".to_string(), None, internal)
    } else {
        let message = if text.is_empty() { canonical } else { text };
        (message, None, None)
    }
}
