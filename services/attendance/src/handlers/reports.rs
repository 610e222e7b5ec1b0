use axum::{
    Json,
    extract::{Query, State},
    response::Response,
};

use rollcall_core::clock::today;

use crate::error::AttendanceError;
use crate::handlers::csv_attachment;
use crate::state::AppState;
use crate::usecase::report::{
    GenerateReportUseCase, Report, ReportFilter, export_csv, export_file_name,
};

// ── GET /reports ─────────────────────────────────────────────────────────────

pub async fn get_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Json<Report> {
    let usecase = GenerateReportUseCase { api: &state.api };
    Json(usecase.execute(&filter).await)
}

// ── GET /reports/export ──────────────────────────────────────────────────────

pub async fn export_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, AttendanceError> {
    let usecase = GenerateReportUseCase { api: &state.api };
    let report = usecase.execute(&filter).await;
    let body = export_csv(&report.rows)?;
    Ok(csv_attachment(&export_file_name(today()), body))
}
