use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::shared::app_state::AppState;
use crate::{handlers, system};

/// All application routes
pub fn configure_routes(state: AppState) -> Router {
    let sync_guard =
        || middleware::from_fn_with_state(state.clone(), system::auth::middleware::require_sync_caller);

    Router::new()
        // ========================================
        // SYSTEM
        // ========================================
        .route("/", get(system::handlers::info::home))
        .route("/api/health", get(system::handlers::info::health))
        .route("/api/diagnostics", get(system::handlers::info::diagnostics))
        // ========================================
        // D400 Helpdesk summary dashboard
        // ========================================
        .route(
            "/api/chamados",
            get(handlers::d400_helpdesk_summary::get_summary),
        )
        .route(
            "/api/chamados/refresh",
            post(handlers::d400_helpdesk_summary::refresh_summary).layer(sync_guard()),
        )
        // ========================================
        // U501 Sync from Google Sheets (service credential or scheduler)
        // ========================================
        .route(
            "/api/sync",
            post(handlers::u501_sync_from_sheets::run_sync)
                .get(handlers::u501_sync_from_sheets::run_sync)
                .layer(sync_guard()),
        )
        .route(
            "/api/sync/runs",
            get(handlers::u501_sync_from_sheets::list_runs).layer(sync_guard()),
        )
        .route(
            "/api/sync/runs/:session_id",
            get(handlers::u501_sync_from_sheets::get_run).layer(sync_guard()),
        )
        .with_state(state)
}
