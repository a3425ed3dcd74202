use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::state::AppState;

// ── GET /healthz ─────────────────────────────────────────────────────────────

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

// ── GET /readyz ──────────────────────────────────────────────────────────────

/// Not ready while the store is unreachable, since every route needs it.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.backend.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = ?e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
