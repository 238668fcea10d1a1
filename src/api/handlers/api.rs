/*
 * Responsibility
 * - Protected business handlers: profile, message, location update
 * - Identity arrives via request extensions, placed there by the auth gate
 */
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::error;

use crate::api::dto::{location::LocationUpdateRequest, message::MessageRequest};
use crate::error::AppError;
use crate::services::supabase::Identity;
use crate::state::AppState;

pub async fn get_profile(Extension(identity): Extension<Identity>) -> Json<Value> {
    Json(json!({
        "id": identity.id,
        "email": identity.email,
        "user_metadata": identity.user_metadata,
        "app_metadata": identity.app_metadata,
    }))
}

pub async fn send_message(
    Extension(identity): Extension<Identity>,
    Json(req): Json<MessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    req.validate().map_err(AppError::validation)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Message received",
            "content": req.content,
            "userId": identity.id,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    ))
}

pub async fn update_location(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<LocationUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let data = state
        .supabase
        .upsert_location(
            &identity.id,
            req.latitude,
            req.longitude,
            req.accuracy,
            req.location_type.as_str(),
        )
        .await
        .map_err(|e| {
            error!(user_id = %identity.id, error = %e, "failed to update location");
            AppError::downstream("Failed to update location", e.to_string())
        })?;

    Ok(Json(json!({
        "status": "success",
        "message": "Location updated successfully",
        "data": data,
    })))
}
