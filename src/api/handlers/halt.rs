use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::coordination::Coordinator;
use crate::domain::halt::HaltInfo;

#[derive(Debug, Deserialize)]
pub struct TriggerHaltRequest {
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HaltResponse {
    pub halted: bool,
    pub reason: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<HaltInfo> for HaltResponse {
    fn from(info: HaltInfo) -> Self {
        Self {
            halted: info.halted,
            reason: info.reason,
            timestamp: info.timestamp,
        }
    }
}

/// GET /api/halt
pub async fn get_halt(State(coordinator): State<Coordinator>) -> Json<HaltResponse> {
    Json(HaltResponse::from(coordinator.halt_status().await))
}

/// Raise the global stop
///
/// POST /api/halt
pub async fn trigger_halt(
    State(coordinator): State<Coordinator>,
    Json(req): Json<TriggerHaltRequest>,
) -> Result<Json<HaltResponse>, ApiError> {
    let info = coordinator.trigger_halt(req.reason).await?;
    Ok(Json(HaltResponse::from(info)))
}

/// DELETE /api/halt
pub async fn clear_halt(State(coordinator): State<Coordinator>) -> Result<StatusCode, ApiError> {
    coordinator.clear_halt().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Wipe all agents, tasks and halt state (operator recovery)
///
/// DELETE /api/state
pub async fn clear_state(State(coordinator): State<Coordinator>) -> Result<StatusCode, ApiError> {
    coordinator.clear_state().await?;
    Ok(StatusCode::NO_CONTENT)
}
