use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::dashboards::d400_helpdesk_summary::service;
use crate::shared::app_state::AppState;

/// GET /api/chamados
pub async fn get_summary(State(state): State<AppState>) -> Response {
    let load = service::load_summary(
        &state.stores,
        &state.credentials,
        state.config.dashboard.table_limit,
    );

    match service::cached_summary(&state.summary_cache, load).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            tracing::error!("Dashboard summary failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": true, "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /api/chamados/refresh
///
/// Recomputes the summary from the datastore and replaces the cached copy.
pub async fn refresh_summary(State(state): State<AppState>) -> Response {
    let load = service::load_summary(
        &state.stores,
        &state.credentials,
        state.config.dashboard.table_limit,
    );

    match service::refresh_summary(&state.summary_cache, load).await {
        Ok(summary) => Json(json!({
            "success": true,
            "message": "Dados atualizados com sucesso",
            "timestamp": Utc::now(),
            "data": summary,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Dashboard refresh failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Erro ao atualizar dados",
                    "error": e.to_string(),
                    "timestamp": Utc::now(),
                })),
            )
                .into_response()
        }
    }
}
