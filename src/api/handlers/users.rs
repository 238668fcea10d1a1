/*
 * Responsibility
 * - /api/users CRUD, forwarded to the identity provider's admin API
 * - Provider 4xx messages are safe to relay; anything else becomes a
 *   generic downstream failure
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use crate::api::dto::users::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use crate::error::AppError;
use crate::services::supabase::{AdminUser, SupabaseError};
use crate::state::AppState;

fn map_admin_error(op: &'static str, id: Option<Uuid>, e: SupabaseError) -> AppError {
    match e.status() {
        Some(404) => AppError::not_found(match id {
            Some(id) => format!("User with ID {id}"),
            None => "User".to_string(),
        }),
        Some(status) if (400..500).contains(&status) => AppError::validation(
            e.api_message()
                .unwrap_or_else(|| "invalid request".to_string()),
        ),
        _ => {
            error!(error = %e, "{op} failed");
            AppError::downstream(op, e.to_string())
        }
    }
}

fn user_body(user: &AdminUser) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "created_at": user.created_at,
        "last_sign_in_at": user.last_sign_in_at,
        "user_metadata": user.user_metadata,
    })
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    req.validate().map_err(AppError::validation)?;

    let user = state
        .supabase
        .create_user(&req.email, &req.password, req.display_name.as_deref())
        .await
        .map_err(|e| map_admin_error("Failed to create user", None, e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "email": user.email,
            "created_at": user.created_at,
            "user_metadata": user.user_metadata,
        })),
    ))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Value>, AppError> {
    let (page, limit) = (query.page(), query.limit());

    let result = state
        .supabase
        .list_users(page, limit)
        .await
        .map_err(|e| map_admin_error("Failed to list users", None, e))?;

    Ok(Json(json!({
        "users": result.users.iter().map(user_body).collect::<Vec<_>>(),
        "total": result.total,
        "page": page,
        "limit": limit,
    })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .supabase
        .get_user_by_id(id)
        .await
        .map_err(|e| map_admin_error("Failed to get user", Some(id), e))?;

    Ok(Json(user_body(&user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let user = state
        .supabase
        .update_user_by_id(id, req.email.as_deref(), req.display_name.as_deref())
        .await
        .map_err(|e| map_admin_error("Failed to update user", Some(id), e))?;

    Ok(Json(json!({
        "id": user.id,
        "email": user.email,
        "updated_at": Utc::now().to_rfc3339(),
        "user_metadata": user.user_metadata,
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .supabase
        .delete_user(id)
        .await
        .map_err(|e| map_admin_error("Failed to delete user", Some(id), e))?;

    Ok(Json(json!({
        "id": id,
        "deleted": true,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
