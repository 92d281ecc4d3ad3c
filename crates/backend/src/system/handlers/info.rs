use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::shared::app_state::AppState;

const ENDPOINTS: [&str; 8] = [
    "GET /api/health",
    "GET /api/diagnostics",
    "GET /api/chamados",
    "POST /api/chamados/refresh",
    "POST /api/sync",
    "GET /api/sync/runs",
    "GET /api/sync/runs/:session_id",
    "GET /",
];

/// GET /
pub async fn home() -> Json<Value> {
    Json(json!({
        "name": "TechHelp Dashboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
        "endpoints": ENDPOINTS,
        "timestamp": Utc::now(),
    }))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "cache_warm": state.summary_cache.is_warm(),
        "timestamp": Utc::now(),
    }))
}

/// GET /api/diagnostics
///
/// Reports which environment variables are set (never their values) and
/// probes the destination table.
pub async fn diagnostics(State(state): State<AppState>) -> Response {
    let mut report = json!({
        "timestamp": Utc::now(),
        "env_vars": state.credentials.presence(),
    });

    let probe = async {
        let datastore = state.credentials.require_datastore()?;
        let store = state.stores.connect(&datastore).await?;
        anyhow::Ok(store.describe().await?)
    };

    match probe.await {
        Ok(description) => {
            report["datastore"] = json!(description);
            report["status"] = json!("ok");
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            tracing::warn!("Diagnostics failed: {}", e);
            report["status"] = json!("error");
            report["error"] = json!(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(report)).into_response()
        }
    }
}
