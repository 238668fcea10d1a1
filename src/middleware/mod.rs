/*
 * Responsibility
 * - Middleware surface (re-exports only)
 */
pub mod auth;
pub mod cors;
pub mod error_normalizer;
pub mod http;
pub mod metrics;
pub mod rate_limit;
pub mod security_headers;
