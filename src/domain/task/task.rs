use super::value_objects::{TaskStatus, TaskUpdate};
use crate::domain::errors::{TransitionError, TransitionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of delegated work
///
/// # Invariants
/// - Status only moves forward: pending, in progress, completed
/// - `agent_id` is set exactly once, when the task starts
/// - `updates` only grows, and only while the task is in progress
/// - `result` and `completed_at` are written once, on completion
///
/// # Example
/// ```
/// use agent_coordinator::domain::task::{Task, TaskStatus};
/// use uuid::Uuid;
///
/// let mut task = Task::new("Summarize the logs".to_string());
/// assert_eq!(task.status(), TaskStatus::Pending);
///
/// task.start(Uuid::new_v4()).expect("pending task can start");
/// task.complete("done".to_string()).expect("running task can complete");
/// assert_eq!(task.result(), Some("done"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: Uuid,
    prompt: String,
    status: TaskStatus,
    agent_id: Option<Uuid>,
    updates: Vec<TaskUpdate>,
    result: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task
    ///
    /// The prompt is opaque to this layer and is stored verbatim.
    pub fn new(prompt: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt,
            status: TaskStatus::Pending,
            agent_id: None,
            updates: Vec::new(),
            result: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Hands the task to an agent (Pending -> InProgress)
    pub fn start(&mut self, agent_id: Uuid) -> TransitionResult<()> {
        if !self.status.can_transition_to(TaskStatus::InProgress) {
            return Err(TransitionError::TaskNotPending(self.id));
        }

        self.status = TaskStatus::InProgress;
        self.agent_id = Some(agent_id);
        Ok(())
    }

    /// Appends a progress note
    ///
    /// # Business Rules
    /// - Task must be in progress
    pub fn record_update(&mut self, message: String) -> TransitionResult<()> {
        if self.status != TaskStatus::InProgress {
            return Err(TransitionError::TaskNotInProgress(self.id));
        }

        self.updates.push(TaskUpdate::now(message));
        Ok(())
    }

    /// Records the result (InProgress -> Completed)
    pub fn complete(&mut self, result: String) -> TransitionResult<()> {
        if !self.status.can_transition_to(TaskStatus::Completed) {
            return Err(TransitionError::TaskNotInProgress(self.id));
        }

        self.status = TaskStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn agent_id(&self) -> Option<Uuid> {
        self.agent_id
    }

    pub fn updates(&self) -> &[TaskUpdate] {
        &self.updates
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}
