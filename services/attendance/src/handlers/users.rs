use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::domain::types::{Class, NewUser, Role, User, UserPatch};
use crate::domain::validation::validate_user_data;
use crate::error::AttendanceError;
use crate::state::AppState;

// ── Response types ───────────────────────────────────────────────────────────

/// Account as exposed over HTTP. The credential is never included.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub assigned_classes: Vec<String>,
    #[serde(serialize_with = "rollcall_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            assigned_classes: user.assigned_classes,
            created_at: user.created_at,
        }
    }
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserResponse>> {
    let users = state.api.get_users().await;
    Json(users.into_iter().map(UserResponse::from).collect())
}

// ── POST /users ──────────────────────────────────────────────────────────────

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<UserResponse>), AttendanceError> {
    validate_user_data(&body)?;
    let user = state.api.add_user(&body).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AttendanceError> {
    let user = state
        .api
        .get_user_by_id(&id)
        .await
        .ok_or(AttendanceError::UserNotFound)?;
    Ok(Json(user.into()))
}

// ── PATCH /users/{id} ────────────────────────────────────────────────────────

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserResponse>, AttendanceError> {
    let existing = state
        .api
        .get_user_by_id(&id)
        .await
        .ok_or(AttendanceError::UserNotFound)?;
    let mut merged = existing;
    patch.apply(&mut merged);
    validate_user_data(&NewUser {
        username: merged.username,
        password: merged.password,
        role: merged.role,
        assigned_classes: Vec::new(),
    })?;

    let user = state
        .api
        .update_user(&id, &patch)
        .await?
        .ok_or(AttendanceError::UserNotFound)?;
    Ok(Json(user.into()))
}

// ── DELETE /users/{id} ───────────────────────────────────────────────────────

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AttendanceError> {
    state.api.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/{id}/classes ──────────────────────────────────────────────────

pub async fn list_teacher_classes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Class>> {
    Json(state.api.get_classes_for_teacher(&id).await)
}

// ── PUT /users/{id}/classes/{class_id} ───────────────────────────────────────

pub async fn assign_class(
    State(state): State<AppState>,
    Path((id, class_id)): Path<(String, String)>,
) -> Result<StatusCode, AttendanceError> {
    if !state.api.assign_class_to_teacher(&id, &class_id).await? {
        return Err(AttendanceError::UserNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /users/{id}/classes/{class_id} ────────────────────────────────────

pub async fn unassign_class(
    State(state): State<AppState>,
    Path((id, class_id)): Path<(String, String)>,
) -> Result<StatusCode, AttendanceError> {
    if !state.api.unassign_class_from_teacher(&id, &class_id).await? {
        return Err(AttendanceError::UserNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
