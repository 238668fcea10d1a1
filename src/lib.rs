/*
 * Responsibility
 * - Crate surface: module declarations shared by the binary and tests
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
