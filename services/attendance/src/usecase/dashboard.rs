use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::api::DataApi;
use crate::domain::repository::Storage;
use crate::usecase::report::{ReportRow, ReportSummary, ViewerScope, join_rows};

/// Records listed under recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 8;

/// Days counted by `this_week`, today included.
const WEEK_DAYS: u64 = 7;

/// Aggregates shown to a signed-in viewer, scoped like reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub class_count: usize,
    pub student_count: usize,
    pub record_count: usize,
    /// Marks dated today.
    pub today: ReportSummary,
    pub this_week: usize,
    /// Newest first.
    pub recent: Vec<ReportRow>,
}

// ── Dashboard ────────────────────────────────────────────────────────────────

pub struct DashboardUseCase<'a, S: Storage> {
    pub api: &'a DataApi<S>,
}

impl<S: Storage> DashboardUseCase<'_, S> {
    pub async fn execute(&self, viewer_id: Option<&str>, today: NaiveDate) -> Dashboard {
        let scope = ViewerScope::resolve(self.api, viewer_id).await;

        let mut classes = self.api.get_classes().await;
        classes.retain(|c| scope.covers(&c.id));
        let mut students = self.api.get_students().await;
        students.retain(|s| scope.covers(&s.class_id));
        let mut records = self.api.get_attendance_records().await;
        records.retain(|r| scope.covers(&r.class_id));

        let today_summary =
            ReportSummary::tally(records.iter().filter(|r| r.date == today).map(|r| r.status));
        let week_start = today
            .checked_sub_days(Days::new(WEEK_DAYS - 1))
            .unwrap_or(NaiveDate::MIN);
        let this_week = records.iter().filter(|r| r.date >= week_start).count();
        let record_count = records.len();

        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(RECENT_ACTIVITY_LIMIT);

        Dashboard {
            class_count: classes.len(),
            student_count: students.len(),
            record_count,
            today: today_summary,
            this_week,
            recent: join_rows(self.api, records).await,
        }
    }
}
