use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use rollcall_core::clock::today;

use crate::state::AppState;
use crate::usecase::dashboard::{Dashboard, DashboardUseCase};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub viewer_id: Option<String>,
}

// ── GET /dashboard ───────────────────────────────────────────────────────────

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<Dashboard> {
    let usecase = DashboardUseCase { api: &state.api };
    Json(usecase.execute(query.viewer_id.as_deref(), today()).await)
}
