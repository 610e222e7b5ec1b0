use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::types::{AttendanceMark, AttendanceRecord};
use crate::error::AttendanceError;
use crate::state::AppState;

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct AttendanceQuery {
    pub date: Option<NaiveDate>,
    pub class_id: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AttendanceRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub class_id: Option<String>,
    pub student_id: Option<String>,
}

// ── GET /attendance ──────────────────────────────────────────────────────────

/// `date` + `class_id` selects one class's sheet for a day, `student_id` one
/// student's history; with neither, every record is returned.
pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> Json<Vec<AttendanceRecord>> {
    let records = match query {
        AttendanceQuery {
            date: Some(date),
            class_id: Some(class_id),
            ..
        } => {
            state
                .api
                .get_attendance_by_date_and_class(date, &class_id)
                .await
        }
        AttendanceQuery {
            student_id: Some(student_id),
            ..
        } => state.api.get_attendance_by_student(&student_id).await,
        _ => state.api.get_attendance_records().await,
    };
    Json(records)
}

// ── GET /attendance/range ────────────────────────────────────────────────────

pub async fn list_attendance_in_range(
    State(state): State<AppState>,
    Query(query): Query<AttendanceRangeQuery>,
) -> Json<Vec<AttendanceRecord>> {
    Json(
        state
            .api
            .get_attendance_by_date_range(
                query.from,
                query.to,
                query.class_id.as_deref(),
                query.student_id.as_deref(),
            )
            .await,
    )
}

// ── PUT /attendance ──────────────────────────────────────────────────────────

pub async fn upsert_attendance(
    State(state): State<AppState>,
    Json(mark): Json<AttendanceMark>,
) -> Result<Json<AttendanceRecord>, AttendanceError> {
    Ok(Json(state.api.upsert_attendance(&mark).await?))
}
