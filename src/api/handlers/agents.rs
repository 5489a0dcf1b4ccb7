use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tasks::TaskResponse;
use crate::api::errors::ApiError;
use crate::coordination::{Coordinator, WaitOutcome};
use crate::domain::agent::{Agent, AgentStatus};

/// Query parameters for listing agents
#[derive(Debug, Deserialize)]
pub struct ListAgentsQuery {
    pub status: Option<String>,
}

/// Agent representation returned by the API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub status: String,
    pub current_task_id: Option<Uuid>,
    pub enlisted_at: DateTime<Utc>,
}

impl From<&Agent> for AgentResponse {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            name: agent.name().map(str::to_string),
            status: agent.status().to_string(),
            current_task_id: agent.current_task_id(),
            enlisted_at: agent.enlisted_at(),
        }
    }
}

/// Result of waiting for work
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum WaitResponse {
    Task { task: TaskResponse },
    Removed,
}

/// Enlist a new idle agent
///
/// POST /api/agents
pub async fn register_agent(
    State(coordinator): State<Coordinator>,
) -> Result<(StatusCode, Json<AgentResponse>), ApiError> {
    let agent = coordinator.register_agent().await?;
    Ok((StatusCode::CREATED, Json(AgentResponse::from(&agent))))
}

/// List agents, optionally only those with a given status
///
/// GET /api/agents?status=idle
pub async fn list_agents(
    State(coordinator): State<Coordinator>,
    Query(query): Query<ListAgentsQuery>,
) -> Result<Json<Vec<AgentResponse>>, ApiError> {
    let agents = match query.status.as_deref() {
        None => coordinator.get_all_agents().await,
        Some("idle") => coordinator.get_available_agents().await,
        Some("busy") => coordinator
            .get_all_agents()
            .await
            .into_iter()
            .filter(|a| a.status() == AgentStatus::Busy)
            .collect(),
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Unknown agent status '{}', expected 'idle' or 'busy'",
                other
            )))
        }
    };

    Ok(Json(agents.iter().map(AgentResponse::from).collect()))
}

/// Get an agent by ID
///
/// GET /api/agents/:id
pub async fn get_agent(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = coordinator
        .get_agent(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Agent not found: {}", id)))?;

    Ok(Json(AgentResponse::from(&agent)))
}

/// Find an agent by the name it was given at assignment
///
/// GET /api/agents/by-name/:name
pub async fn get_agent_by_name(
    State(coordinator): State<Coordinator>,
    Path(name): Path<String>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = coordinator
        .find_agent_by_name(&name)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No agent named '{}'", name)))?;

    Ok(Json(AgentResponse::from(&agent)))
}

/// Remove an agent, busy or not
///
/// DELETE /api/agents/:id
pub async fn remove_agent(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !coordinator.remove_agent(id).await? {
        return Err(ApiError::not_found(format!("Agent not found: {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Tasks ever assigned to an agent
///
/// GET /api/agents/:id/tasks
pub async fn get_agent_tasks(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = coordinator.get_tasks_for_agent(id).await;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}

/// Block until the agent is assigned a task, removed, or halted
///
/// GET /api/agents/:id/wait
pub async fn wait_for_task(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
) -> Result<Json<WaitResponse>, ApiError> {
    match coordinator.wait_for_task(id).await {
        WaitOutcome::Task { task } => Ok(Json(WaitResponse::Task {
            task: TaskResponse::from(&task),
        })),
        WaitOutcome::Removed => Ok(Json(WaitResponse::Removed)),
        WaitOutcome::Halted { reason } => Err(ApiError::halted(reason)),
    }
}
