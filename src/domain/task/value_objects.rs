use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the lifecycle status of a task
///
/// # Status Transitions
/// ```text
/// Pending -> InProgress -> Completed
/// ```
/// The lifecycle is one-way; completed tasks are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting for an agent
    Pending,
    /// Task has been handed to an agent
    InProgress,
    /// Task has a result
    Completed,
}

impl TaskStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use agent_coordinator::domain::task::TaskStatus;
    ///
    /// assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
    /// assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
    /// ```
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!((self, next), (Pending, InProgress) | (InProgress, Completed))
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A progress note appended by the working agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl TaskUpdate {
    pub fn now(message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transition_pending_to_in_progress() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
    }

    #[test]
    fn valid_transition_in_progress_to_completed() {
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn invalid_transition_pending_to_completed() {
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn invalid_transition_backwards() {
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn status_display_matches_wire_format() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            let wire = serde_json::to_string(&status).unwrap();
            assert_eq!(wire, format!("\"{}\"", status));
        }
    }
}
