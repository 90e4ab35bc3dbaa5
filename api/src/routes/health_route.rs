//! GET /health: configuration status, never the credential itself.

use std::sync::Arc;

use axum::{Json, extract::State};
use completion_service::health_service::ConfigHealth;
use serde::Serialize;

use crate::core::app_state::{AppState, StatsSnapshot};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub completion: ConfigHealth,
    pub min_interval_ms: u128,
    pub uptime_secs: u64,
    /// Number of environment variables visible to the process.
    pub env_var_count: usize,
    #[serde(flatten)]
    pub stats: StatsSnapshot,
}

/// Handler: GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let completion = ConfigHealth::from_config(&state.config.completion);

    Json(HealthResponse {
        status: completion.status(),
        completion,
        min_interval_ms: state.throttle.min_interval().as_millis(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        env_var_count: std::env::vars_os().count(),
        stats: state.stats.snapshot(),
    })
}
