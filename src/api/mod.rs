// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter over the coordinator

pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::coordination::Coordinator;
use handlers::{agents, halt, health_check, tasks};

/// Builds the tool surface router over a coordinator
pub fn router(coordinator: Coordinator) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Agents
        .route("/api/agents", post(agents::register_agent).get(agents::list_agents))
        .route(
            "/api/agents/by-name/:name",
            get(agents::get_agent_by_name),
        )
        .route("/api/agents/:id", get(agents::get_agent).delete(agents::remove_agent))
        .route("/api/agents/:id/tasks", get(agents::get_agent_tasks))
        .route("/api/agents/:id/wait", get(agents::wait_for_task))
        // Tasks
        .route("/api/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/api/tasks/:id", get(tasks::get_task))
        .route("/api/tasks/:id/assign", post(tasks::assign_task))
        .route("/api/tasks/:id/updates", post(tasks::update_task))
        .route("/api/tasks/:id/complete", post(tasks::complete_task))
        .route("/api/delegate", post(tasks::delegate_task))
        // Halt and recovery
        .route(
            "/api/halt",
            get(halt::get_halt)
                .post(halt::trigger_halt)
                .delete(halt::clear_halt),
        )
        .route("/api/state", axum::routing::delete(halt::clear_state))
        .with_state(coordinator)
}
