//! Liveness endpoint, served outside the request pipeline.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use keeweb_session::SessionStore;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

struct HealthState {
    service: String,
    sessions: Arc<SessionStore>,
    started_at: Instant,
}

/// `GET /health`, bound to the service name and session store of `state`.
pub fn router(state: &AppState) -> Router {
    let health = Arc::new(HealthState {
        service: state.config.app.name.clone(),
        sessions: state.sessions.clone(),
        started_at: Instant::now(),
    });
    Router::new()
        .route("/health", get(health_check))
        .with_state(health)
}

async fn health_check(State(health): State<Arc<HealthState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: health.service.clone(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: health.started_at.elapsed().as_secs(),
        active_sessions: health.sessions.len(),
    })
}
