/*
 * Responsibility
 * - GET /health/live: unconditional liveness
 * - GET /health/ready: Supabase connectivity probe; a missing probe table
 *   counts as healthy unless the config says otherwise
 */
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::error;

use crate::services::supabase::ProbeOutcome;
use crate::state::AppState;

const SERVICE: &str = "api";

pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE,
    }))
}

pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let outcome = state.supabase.probe().await;

    let supabase = match outcome {
        ProbeOutcome::Connected => json!({ "status": "ok" }),
        ProbeOutcome::SchemaMissing if !state.config.readiness_require_probe_table => {
            // The connection works; the schema just has not been provisioned.
            json!({ "status": "ok", "note": "probe table missing" })
        }
        ProbeOutcome::SchemaMissing => {
            json!({
                "status": "error",
                "message": "Probe table missing",
            })
        }
        ProbeOutcome::Failed(reason) => {
            error!(reason = %reason, "supabase readiness check failed");
            json!({
                "status": "error",
                "message": "Failed to connect to Supabase",
            })
        }
    };

    let healthy = supabase["status"] == "ok";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "error" },
            "timestamp": Utc::now().to_rfc3339(),
            "service": SERVICE,
            "dependencies": { "supabase": supabase },
        })),
    )
}
