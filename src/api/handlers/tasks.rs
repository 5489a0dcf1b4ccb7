use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agents::AgentResponse;
use super::reject_if_halted;
use crate::api::errors::ApiError;
use crate::coordination::{Coordinator, Delegation};
use crate::domain::task::{Task, TaskStatus, TaskUpdate};

/// Request body for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub prompt: String,
}

/// Request body for assigning a task to a specific agent
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    pub agent_id: Uuid,
    pub name: String,
}

/// Request body for delegating work to whichever agent is free
#[derive(Debug, Deserialize)]
pub struct DelegateRequest {
    pub prompt: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub result: String,
}

/// Task representation returned by the API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub prompt: String,
    pub status: String,
    pub agent_id: Option<Uuid>,
    pub updates: Vec<TaskUpdate>,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            prompt: task.prompt().to_string(),
            status: task.status().to_string(),
            agent_id: task.agent_id(),
            updates: task.updates().to_vec(),
            result: task.result().map(str::to_string),
            created_at: task.created_at(),
            completed_at: task.completed_at(),
        }
    }
}

/// Response from a successful delegation
#[derive(Debug, Serialize, Deserialize)]
pub struct DelegationResponse {
    pub task: TaskResponse,
    pub agent: AgentResponse,
}

/// Create a new pending task
///
/// POST /api/tasks
pub async fn create_task(
    State(coordinator): State<Coordinator>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt cannot be empty"));
    }

    let task = coordinator.create_task(req.prompt).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// List all tasks, oldest first
///
/// GET /api/tasks
pub async fn list_tasks(State(coordinator): State<Coordinator>) -> Json<Vec<TaskResponse>> {
    let tasks = coordinator.get_all_tasks().await;
    Json(tasks.iter().map(TaskResponse::from).collect())
}

/// Get a task by ID
///
/// GET /api/tasks/:id
pub async fn get_task(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = coordinator
        .get_task(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {}", id)))?;

    Ok(Json(TaskResponse::from(&task)))
}

/// Assign a pending task to a named idle agent
///
/// POST /api/tasks/:id/assign
pub async fn assign_task(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    reject_if_halted(&coordinator).await?;
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Agent name cannot be empty"));
    }

    // Explain the common failures up front; the engine re-checks all of
    // them under the lock
    let snapshot = coordinator.snapshot().await;
    let task = snapshot
        .task(id)
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {}", id)))?;
    if task.status() != TaskStatus::Pending {
        return Err(ApiError::conflict(format!(
            "Task {} is {}, only pending tasks can be assigned",
            id,
            task.status()
        )));
    }
    let agent = snapshot
        .agent(req.agent_id)
        .ok_or_else(|| ApiError::not_found(format!("Agent not found: {}", req.agent_id)))?;
    if !agent.is_idle() {
        return Err(ApiError::conflict(format!("Agent {} is busy", req.agent_id)));
    }
    if let Some(holder) = snapshot.agent_by_name(&req.name) {
        if holder.id() != req.agent_id {
            return Err(ApiError::conflict(format!(
                "Agent name '{}' is already in use",
                req.name
            )));
        }
    }

    if !coordinator
        .assign_task_to_agent(id, req.agent_id, req.name)
        .await?
    {
        return Err(ApiError::conflict(
            "Assignment lost a race with another caller; re-read and retry",
        ));
    }

    let task = coordinator
        .get_task(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {}", id)))?;
    Ok(Json(TaskResponse::from(&task)))
}

/// Create a task and hand it to the first idle agent
///
/// POST /api/delegate
pub async fn delegate_task(
    State(coordinator): State<Coordinator>,
    Json(req): Json<DelegateRequest>,
) -> Result<(StatusCode, Json<DelegationResponse>), ApiError> {
    reject_if_halted(&coordinator).await?;
    if req.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt cannot be empty"));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Agent name cannot be empty"));
    }

    let name = req.name.clone();
    match coordinator.delegate_task(req.prompt, req.name).await? {
        Delegation::Assigned { task, agent } => Ok((
            StatusCode::CREATED,
            Json(DelegationResponse {
                task: TaskResponse::from(&task),
                agent: AgentResponse::from(&agent),
            }),
        )),
        Delegation::NoAvailableAgent => Err(ApiError::conflict(
            "No idle agent is available; register more agents or wait for one to finish",
        )),
        Delegation::NameTaken => Err(ApiError::conflict(format!(
            "Agent name '{}' is already in use",
            name
        ))),
    }
}

/// Append a progress note to a running task
///
/// POST /api/tasks/:id/updates
pub async fn update_task(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    reject_if_halted(&coordinator).await?;

    if !coordinator.update_task_status(id, req.message).await? {
        return Err(not_running(&coordinator, id).await);
    }

    let task = coordinator
        .get_task(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {}", id)))?;
    Ok(Json(TaskResponse::from(&task)))
}

/// Record a task's result and free its agent
///
/// POST /api/tasks/:id/complete
pub async fn complete_task(
    State(coordinator): State<Coordinator>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    reject_if_halted(&coordinator).await?;

    if !coordinator.complete_task(id, req.result).await? {
        return Err(not_running(&coordinator, id).await);
    }

    let task = coordinator
        .get_task(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Task not found: {}", id)))?;
    Ok(Json(TaskResponse::from(&task)))
}

async fn not_running(coordinator: &Coordinator, id: Uuid) -> ApiError {
    match coordinator.get_task(id).await {
        None => ApiError::not_found(format!("Task not found: {}", id)),
        Some(task) => ApiError::conflict(format!(
            "Task {} is {}, expected in_progress",
            id,
            task.status()
        )),
    }
}
