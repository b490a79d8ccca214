use super::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub active_sessions: usize,
    pub total_sessions: u64,
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /status
/// Session counters
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            service: state.service_name.clone(),
            active_sessions: state.counters.active(),
            total_sessions: state.counters.total(),
        }),
    )
}
