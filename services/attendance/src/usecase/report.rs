use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::DataApi;
use crate::domain::repository::Storage;
use crate::domain::types::{AttendanceRecord, AttendanceStatus};
use crate::error::AttendanceError;

const UNKNOWN: &str = "Unknown";

/// Report filters. Every field is optional; `from` and `to` are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    /// Teachers only see records of their assigned classes.
    pub viewer_id: Option<String>,
    pub class_id: Option<String>,
    pub student_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    fn admits(&self, record: &AttendanceRecord) -> bool {
        self.class_id.as_ref().is_none_or(|c| &record.class_id == c)
            && self.student_id.as_ref().is_none_or(|s| &record.student_id == s)
            && self.from.is_none_or(|from| record.date >= from)
            && self.to.is_none_or(|to| record.date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub date: NaiveDate,
    pub student_id: String,
    pub student_name: String,
    /// Empty when the student no longer exists.
    pub student_email: String,
    pub class_id: String,
    pub class_name: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    /// Whole percent of records marked present.
    pub attendance_rate: u32,
}

impl ReportSummary {
    pub fn of(rows: &[ReportRow]) -> Self {
        Self::tally(rows.iter().map(|r| r.status))
    }

    pub fn tally(statuses: impl IntoIterator<Item = AttendanceStatus>) -> Self {
        let mut summary = Self::default();
        for status in statuses {
            summary.total += 1;
            match status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
            }
        }
        if summary.total > 0 {
            summary.attendance_rate =
                (summary.present as f64 / summary.total as f64 * 100.0).round() as u32;
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

// ── Viewer scope ─────────────────────────────────────────────────────────────

/// Classes whose records a viewer may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerScope {
    Everything,
    Classes(HashSet<String>),
    Nothing,
}

impl ViewerScope {
    /// Teachers are limited to their assigned classes. An id that matches no
    /// user sees nothing.
    pub async fn resolve<S: Storage>(api: &DataApi<S>, viewer_id: Option<&str>) -> Self {
        let Some(viewer_id) = viewer_id else {
            return Self::Everything;
        };
        match api.get_user_by_id(viewer_id).await {
            Some(viewer) if viewer.is_teacher() => Self::Classes(
                api.get_classes_for_teacher(viewer_id)
                    .await
                    .into_iter()
                    .map(|c| c.id)
                    .collect(),
            ),
            Some(_) => Self::Everything,
            None => Self::Nothing,
        }
    }

    pub fn covers(&self, class_id: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Classes(ids) => ids.contains(class_id),
            Self::Nothing => false,
        }
    }
}

/// Joins student and class display names onto records, keeping their order.
pub(crate) async fn join_rows<S: Storage>(
    api: &DataApi<S>,
    records: Vec<AttendanceRecord>,
) -> Vec<ReportRow> {
    let students: HashMap<String, (String, String)> = api
        .get_students()
        .await
        .into_iter()
        .map(|s| (s.id, (s.name, s.email)))
        .collect();
    let classes: HashMap<String, String> = api
        .get_classes()
        .await
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    records
        .into_iter()
        .map(|r| {
            let (student_name, student_email) = students
                .get(&r.student_id)
                .cloned()
                .unwrap_or_else(|| (UNKNOWN.to_owned(), String::new()));
            ReportRow {
                date: r.date,
                class_name: classes
                    .get(&r.class_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_owned()),
                student_id: r.student_id,
                student_name,
                student_email,
                class_id: r.class_id,
                status: r.status,
            }
        })
        .collect()
}

// ── GenerateReport ───────────────────────────────────────────────────────────

pub struct GenerateReportUseCase<'a, S: Storage> {
    pub api: &'a DataApi<S>,
}

impl<S: Storage> GenerateReportUseCase<'_, S> {
    /// Rows are sorted newest first. An unknown viewer sees nothing.
    pub async fn execute(&self, filter: &ReportFilter) -> Report {
        let scope = ViewerScope::resolve(self.api, filter.viewer_id.as_deref()).await;
        let mut records = self.api.get_attendance_records().await;
        records.retain(|r| scope.covers(&r.class_id) && filter.admits(r));
        records.sort_by(|a, b| b.date.cmp(&a.date));

        let rows = join_rows(self.api, records).await;
        let summary = ReportSummary::of(&rows);
        Report { rows, summary }
    }
}

// ── Export ───────────────────────────────────────────────────────────────────

/// `Feb 1, 2024`
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("attendance_report_{}.csv", today.format("%Y-%m-%d"))
}

pub fn export_csv(rows: &[ReportRow]) -> Result<String, AttendanceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Date", "Student Name", "Email", "Class", "Status"])
        .context("write report header")?;
    for row in rows {
        writer
            .write_record([
                format_report_date(row.date).as_str(),
                row.student_name.as_str(),
                row.student_email.as_str(),
                row.class_name.as_str(),
                row.status.label(),
            ])
            .context("write report row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush report: {}", e.error()))?;
    Ok(String::from_utf8(bytes).context("report is not UTF-8")?)
}
