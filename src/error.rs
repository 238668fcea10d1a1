/*
 * Responsibility
 * - App-wide AppError taxonomy (each variant carries its HTTP status)
 * - Wire-level ErrorEnvelope shape shared by every non-2xx response
 * - IntoResponse stashes the parts; the error_normalizer middleware renders
 *   the final envelope once the request path is known
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Canonical error body for all non-2xx responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: String,
    pub path: String,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, message: String, details: Option<String>, path: &str) -> Self {
        Self {
            status_code: status.as_u16(),
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
            path: path.to_string(),
        }
    }
}

/// Response-extension payload handed from `AppError::into_response` to the
/// error_normalizer, which owns the final envelope and the log line.
#[derive(Debug, Clone)]
pub struct ErrorParts {
    /// Client-safe message (already genericized for 5xx).
    pub message: String,
    pub details: Option<String>,
    /// Server-log-only detail; never sent to the client.
    pub internal: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization format")]
    MalformedAuthHeader,

    /// Covers every verifier failure: provider rejection, network error,
    /// timeout. `reason` is for the server log only.
    #[error("Invalid token")]
    InvalidToken { reason: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Too many requests")]
    RateLimited,

    /// Supabase (or any downstream) failure not classifiable above.
    #[error("{context}")]
    Downstream { context: &'static str, detail: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn downstream(context: &'static str, detail: impl Into<String>) -> Self {
        Self::Downstream {
            context,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingAuthHeader | Self::MalformedAuthHeader | Self::InvalidToken { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Downstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller. Below 500 the specific message
    /// is returned verbatim; 500s always get the generic one.
    pub fn client_message(&self) -> String {
        if self.status().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    fn parts(&self) -> ErrorParts {
        let details = self
            .status()
            .canonical_reason()
            .map(|reason| reason.to_string());
        let internal = match self {
            Self::InvalidToken { reason } => Some(reason.clone()),
            Self::Downstream { context, detail } => Some(format!("{context}: {detail}")),
            _ => None,
        };
        ErrorParts {
            message: self.client_message(),
            details,
            internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let parts = self.parts();

        // Self-contained fallback body; the normalizer replaces it with the
        // full envelope (path included) on the way out.
        let envelope = ErrorEnvelope::new(status, parts.message.clone(), parts.details.clone(), "");

        let mut response = (status, Json(envelope)).into_response();
        response.extensions_mut().insert(parts);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        for err in [
            AppError::MissingAuthHeader,
            AppError::MalformedAuthHeader,
            AppError::InvalidToken {
                reason: "provider said no".into(),
            },
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn server_errors_hide_detail_from_client() {
        let err = AppError::downstream("location upsert failed", "pg: connection refused");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Internal server error");
        let parts = err.parts();
        assert!(parts.internal.unwrap().contains("connection refused"));
    }

    #[test]
    fn client_errors_return_specific_message() {
        let err = AppError::validation("latitude must be between -90 and 90");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "latitude must be between -90 and 90");
    }

    #[test]
    fn invalid_token_never_exposes_provider_reason() {
        let err = AppError::InvalidToken {
            reason: "JWT expired at 2024-01-01".into(),
        };
        assert_eq!(err.client_message(), "Invalid token");
    }
}
