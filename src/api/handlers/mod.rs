// HTTP handlers, one module per resource

pub mod agents;
pub mod halt;
pub mod tasks;

use crate::api::errors::ApiError;
use crate::coordination::Coordinator;

/// Health check
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// Agent-facing actions refuse to run once a halt is raised
pub(crate) async fn reject_if_halted(coordinator: &Coordinator) -> Result<(), ApiError> {
    let halt = coordinator.halt_status().await;
    if halt.halted {
        return Err(ApiError::halted(halt.reason));
    }
    Ok(())
}
