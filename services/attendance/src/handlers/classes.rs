use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::domain::types::{Class, ClassPatch, NewClass, Student};
use crate::domain::validation::validate_class_data;
use crate::error::AttendanceError;
use crate::handlers::csv_attachment;
use crate::state::AppState;
use crate::usecase::import::{
    CLASS_IMPORT_TEMPLATE, CLASS_TEMPLATE_FILE_NAME, ImportClassesUseCase, ImportSummary,
};

// ── GET /classes ─────────────────────────────────────────────────────────────

pub async fn list_classes(State(state): State<AppState>) -> Json<Vec<Class>> {
    Json(state.api.get_classes().await)
}

// ── POST /classes ────────────────────────────────────────────────────────────

pub async fn create_class(
    State(state): State<AppState>,
    Json(body): Json<NewClass>,
) -> Result<(StatusCode, Json<Class>), AttendanceError> {
    validate_class_data(&body)?;
    let class = state.api.add_class(&body).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

// ── GET /classes/{id} ────────────────────────────────────────────────────────

pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Class>, AttendanceError> {
    state
        .api
        .get_class_by_id(&id)
        .await
        .map(Json)
        .ok_or(AttendanceError::ClassNotFound)
}

// ── PATCH /classes/{id} ──────────────────────────────────────────────────────

pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ClassPatch>,
) -> Result<Json<Class>, AttendanceError> {
    let mut merged = state
        .api
        .get_class_by_id(&id)
        .await
        .ok_or(AttendanceError::ClassNotFound)?;
    patch.apply(&mut merged);
    validate_class_data(&NewClass {
        name: merged.name,
        subject: merged.subject,
        schedule: merged.schedule,
    })?;

    state
        .api
        .update_class(&id, &patch)
        .await?
        .map(Json)
        .ok_or(AttendanceError::ClassNotFound)
}

// ── DELETE /classes/{id} ─────────────────────────────────────────────────────

pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AttendanceError> {
    state.api.delete_class(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /classes/{id}/students ───────────────────────────────────────────────

pub async fn list_class_students(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Student>> {
    Json(state.api.get_students_by_class(&id).await)
}

// ── POST /classes/import ─────────────────────────────────────────────────────

pub async fn import_classes(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>, AttendanceError> {
    let usecase = ImportClassesUseCase { api: &state.api };
    Ok(Json(usecase.execute(&body).await?))
}

// ── GET /classes/import/template ─────────────────────────────────────────────

pub async fn class_import_template() -> Response {
    csv_attachment(CLASS_TEMPLATE_FILE_NAME, CLASS_IMPORT_TEMPLATE.to_owned())
}
