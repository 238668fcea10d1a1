/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone-cheap: everything inside is Arc or atomic
 */
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::rate_limit::RateLimiter;
use crate::routes::RouteTable;
use crate::services::{monitoring::Metrics, supabase::SupabaseClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub supabase: Arc<SupabaseClient>,
    pub metrics: Metrics,
    pub rate_limiter: Arc<RateLimiter>,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(
        config: Config,
        supabase: SupabaseClient,
        metrics: Metrics,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            supabase: Arc::new(supabase),
            metrics,
            rate_limiter: Arc::new(rate_limiter),
            routes: RouteTable::new(),
        }
    }
}
