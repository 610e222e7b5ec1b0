use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::domain::types::{NewStudent, Student, StudentPatch};
use crate::domain::validation::validate_student_data;
use crate::error::AttendanceError;
use crate::handlers::csv_attachment;
use crate::state::AppState;
use crate::usecase::import::{
    ImportStudentsUseCase, ImportSummary, STUDENT_TEMPLATE_FILE_NAME, student_import_template,
};

const FALLBACK_SAMPLE_CLASS: &str = "Mathematics";

// ── GET /students ────────────────────────────────────────────────────────────

pub async fn list_students(State(state): State<AppState>) -> Json<Vec<Student>> {
    Json(state.api.get_students().await)
}

// ── POST /students ───────────────────────────────────────────────────────────

pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<NewStudent>,
) -> Result<(StatusCode, Json<Student>), AttendanceError> {
    validate_student_data(&body)?;
    let student = state.api.add_student(&body).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

// ── GET /students/{id} ───────────────────────────────────────────────────────

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AttendanceError> {
    state
        .api
        .get_student_by_id(&id)
        .await
        .map(Json)
        .ok_or(AttendanceError::StudentNotFound)
}

// ── PATCH /students/{id} ─────────────────────────────────────────────────────

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<StudentPatch>,
) -> Result<Json<Student>, AttendanceError> {
    let mut merged = state
        .api
        .get_student_by_id(&id)
        .await
        .ok_or(AttendanceError::StudentNotFound)?;
    patch.apply(&mut merged);
    validate_student_data(&NewStudent {
        name: merged.name,
        email: merged.email,
        class_id: merged.class_id,
        enrollment_date: Some(merged.enrollment_date),
    })?;

    state
        .api
        .update_student(&id, &patch)
        .await?
        .map(Json)
        .ok_or(AttendanceError::StudentNotFound)
}

// ── DELETE /students/{id} ────────────────────────────────────────────────────

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AttendanceError> {
    state.api.delete_student(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /students/import ────────────────────────────────────────────────────

pub async fn import_students(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportSummary>, AttendanceError> {
    let usecase = ImportStudentsUseCase { api: &state.api };
    Ok(Json(usecase.execute(&body).await?))
}

// ── GET /students/import/template ────────────────────────────────────────────

/// The sample rows name the first stored class so the template imports as-is.
pub async fn student_import_template_file(State(state): State<AppState>) -> Response {
    let classes = state.api.get_classes().await;
    let sample = classes
        .first()
        .map(|c| c.name.as_str())
        .unwrap_or(FALLBACK_SAMPLE_CLASS);
    csv_attachment(STUDENT_TEMPLATE_FILE_NAME, student_import_template(sample))
}
