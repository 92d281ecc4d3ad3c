use axum::{
    extract::{Path, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::usecases::u501_sync_from_sheets::{SyncFailureResponse, SyncRunProgress};

use crate::shared::app_state::AppState;
use crate::usecases::u501_sync_from_sheets::SyncTrigger;

/// POST /api/sync (GET accepted too)
pub async fn run_sync(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let from_scheduler = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|agent| agent == state.config.scheduler.user_agent);
    let trigger = if from_scheduler {
        SyncTrigger::Scheduler
    } else {
        SyncTrigger::Manual
    };

    match state.executor.execute(trigger).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.to_response())).into_response(),
        Err(e) => (e.http_status(), Json(SyncFailureResponse::new(e.to_string()))).into_response(),
    }
}

/// GET /api/sync/runs
pub async fn list_runs(State(state): State<AppState>) -> Json<Vec<SyncRunProgress>> {
    Json(state.executor.tracker.list_runs())
}

/// GET /api/sync/runs/:session_id
pub async fn get_run(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SyncRunProgress>, StatusCode> {
    state
        .executor
        .tracker
        .get_run(&session_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
