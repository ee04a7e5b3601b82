//! Health endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// Seconds since startup
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    /// Live rooms
    pub rooms: usize,
}

impl HealthReport {
    pub fn collect(state: &AppState) -> Self {
        Self {
            status: "healthy",
            uptime: state.uptime().as_secs_f64(),
            timestamp: Utc::now(),
            environment: state.environment.clone(),
            rooms: state.room_count(),
        }
    }
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(HealthReport::collect(&state))
}
