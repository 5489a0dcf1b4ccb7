use super::value_objects::AgentStatus;
use crate::domain::errors::{TransitionError, TransitionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A worker session enlisted in the pool
///
/// # Invariants
/// - `id` never changes once enlisted
/// - `current_task_id` is set if and only if the agent is busy
/// - `name` stays unset until the first assignment and is then retained
///
/// # Example
/// ```
/// use agent_coordinator::domain::agent::{Agent, AgentStatus};
/// use uuid::Uuid;
///
/// let mut agent = Agent::enlist();
/// assert_eq!(agent.status(), AgentStatus::Idle);
///
/// let task_id = Uuid::new_v4();
/// agent.assign(task_id, "W1".to_string()).expect("idle agent accepts work");
/// assert_eq!(agent.current_task_id(), Some(task_id));
/// assert_eq!(agent.name(), Some("W1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    id: Uuid,
    name: Option<String>,
    status: AgentStatus,
    current_task_id: Option<Uuid>,
    enlisted_at: DateTime<Utc>,
}

impl Agent {
    /// Creates a fresh idle agent with a new identity
    pub fn enlist() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            status: AgentStatus::Idle,
            current_task_id: None,
            enlisted_at: Utc::now(),
        }
    }

    /// Puts the agent to work on a task, naming it in the process
    ///
    /// # Business Rules
    /// - Agent must be idle
    /// - A previous name is replaced by the new one
    pub fn assign(&mut self, task_id: Uuid, name: String) -> TransitionResult<()> {
        if !self.status.can_transition_to(AgentStatus::Busy) {
            return Err(TransitionError::AgentBusy(self.id));
        }

        self.status = AgentStatus::Busy;
        self.current_task_id = Some(task_id);
        self.name = Some(name);
        Ok(())
    }

    /// Returns the agent to the idle pool. The name is kept.
    pub fn release(&mut self) {
        self.status = AgentStatus::Idle;
        self.current_task_id = None;
    }

    pub fn is_idle(&self) -> bool {
        self.status == AgentStatus::Idle
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn current_task_id(&self) -> Option<Uuid> {
        self.current_task_id
    }

    pub fn enlisted_at(&self) -> DateTime<Utc> {
        self.enlisted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enlisted_agent_is_idle_and_unnamed() {
        let agent = Agent::enlist();

        assert_eq!(agent.status(), AgentStatus::Idle);
        assert!(agent.name().is_none());
        assert!(agent.current_task_id().is_none());
        assert!(agent.is_idle());
    }

    #[test]
    fn busy_agent_rejects_second_assignment() {
        let mut agent = Agent::enlist();
        let first = Uuid::new_v4();
        agent.assign(first, "W1".to_string()).unwrap();

        let result = agent.assign(Uuid::new_v4(), "W2".to_string());

        assert_eq!(result, Err(TransitionError::AgentBusy(agent.id())));
        assert_eq!(agent.current_task_id(), Some(first));
        assert_eq!(agent.name(), Some("W1"));
    }

    #[test]
    fn release_keeps_name() {
        let mut agent = Agent::enlist();
        agent.assign(Uuid::new_v4(), "W1".to_string()).unwrap();

        agent.release();

        assert!(agent.is_idle());
        assert!(agent.current_task_id().is_none());
        assert_eq!(agent.name(), Some("W1"));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let agent = Agent::enlist();
        let value = serde_json::to_value(&agent).unwrap();

        assert_eq!(value["status"], "idle");
        assert!(value["currentTaskId"].is_null());
        assert!(value["name"].is_null());
        assert!(value.get("enlistedAt").is_some());
    }
}
