use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, USER_AGENT},
        HeaderMap, HeaderName,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use contracts::usecases::u501_sync_from_sheets::UnauthorizedResponse;

use crate::shared::app_state::AppState;
use crate::usecases::u501_sync_from_sheets::SyncError;

/// A sync call is accepted when it carries the service secret
/// (`Authorization: Bearer <secret>` or the bare secret) or comes from the
/// scheduler's user agent. Without a configured secret only the scheduler
/// agent is accepted.
pub fn is_authorized_sync_call(
    headers: &HeaderMap,
    secret: Option<&str>,
    scheduler_agent: &str,
) -> bool {
    let header = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    if let (Some(secret), Some(auth)) = (secret, header(AUTHORIZATION)) {
        let token = auth.strip_prefix("Bearer ").unwrap_or(auth).trim();
        if constant_time_eq(token, secret) {
            return true;
        }
    }

    header(USER_AGENT) == Some(scheduler_agent)
}

/// Compares every byte so the timing does not reveal the matching prefix
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware guarding the sync and refresh routes
pub async fn require_sync_caller(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let allowed = is_authorized_sync_call(
        req.headers(),
        state.credentials.service_secret(),
        &state.config.scheduler.user_agent,
    );

    if !allowed {
        let err = SyncError::Unauthorized;
        tracing::warn!("Rejected sync call to {}: {}", req.uri().path(), err);
        return (err.http_status(), Json(UnauthorizedResponse::default())).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(axum::http::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_bearer_secret_is_accepted() {
        let h = headers(&[(AUTHORIZATION, "Bearer s3cret")]);
        assert!(is_authorized_sync_call(&h, Some("s3cret"), "pg_cron"));
    }

    #[test]
    fn test_bare_secret_is_accepted() {
        let h = headers(&[(AUTHORIZATION, "s3cret")]);
        assert!(is_authorized_sync_call(&h, Some("s3cret"), "pg_cron"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let h = headers(&[(AUTHORIZATION, "Bearer nope")]);
        assert!(!is_authorized_sync_call(&h, Some("s3cret"), "pg_cron"));
        // a header merely containing the secret is not enough
        let h = headers(&[(AUTHORIZATION, "Bearer xs3cretx")]);
        assert!(!is_authorized_sync_call(&h, Some("s3cret"), "pg_cron"));
    }

    #[test]
    fn test_secret_compare_needs_full_match() {
        assert!(constant_time_eq("s3cret", "s3cret"));
        assert!(!constant_time_eq("s3cres", "s3cret"));
        assert!(!constant_time_eq("s3cre", "s3cret"));
        assert!(!constant_time_eq("", "s3cret"));

        let h = headers(&[(AUTHORIZATION, "Bearer s3cre")]);
        assert!(!is_authorized_sync_call(&h, Some("s3cret"), "pg_cron"));
    }

    #[test]
    fn test_scheduler_agent_is_accepted() {
        let h = headers(&[(USER_AGENT, "pg_cron")]);
        assert!(is_authorized_sync_call(&h, Some("s3cret"), "pg_cron"));
        assert!(is_authorized_sync_call(&h, None, "pg_cron"));
    }

    #[test]
    fn test_without_secret_only_scheduler_passes() {
        let h = headers(&[(AUTHORIZATION, "Bearer anything"), (USER_AGENT, "curl/8.0")]);
        assert!(!is_authorized_sync_call(&h, None, "pg_cron"));
        assert!(!is_authorized_sync_call(&HeaderMap::new(), None, "pg_cron"));
    }
}
