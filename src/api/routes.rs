/*
 * Responsibility
 * - URL structure for the whole gateway
 * - Visibility per path lives in crate::routes; keep the two in sync
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    api::{get_profile, send_message, update_location},
    health::{liveness, readiness},
    monitoring::{metrics, stats},
    users::{create_user, delete_user, get_user, list_users, update_user},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/message", post(send_message))
        .route("/api/user-location-updates", post(update_location))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/monitoring/metrics", get(metrics))
        .route("/monitoring/stats", get(stats))
}
