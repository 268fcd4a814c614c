//! Health check endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::warn;

use crate::backend::CookieJar;
use crate::state::AppState;

/// Liveness probe. Always responds once the process serves traffic.
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness probe. Reports 503 while the backend is unreachable.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let mut jar = CookieJar::new();
    match state.backend().prime_csrf(&mut jar).await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(err) => {
            warn!(error = %err, "backend not reachable");
            (StatusCode::SERVICE_UNAVAILABLE, "backend unreachable")
        }
    }
}
