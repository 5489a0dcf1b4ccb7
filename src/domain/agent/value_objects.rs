use serde::{Deserialize, Serialize};

/// Represents whether an agent session is free to take work
///
/// # Status Transitions
/// ```text
/// Idle -> Busy -> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Agent is waiting for an assignment
    Idle,
    /// Agent is working on exactly one task
    Busy,
}

impl AgentStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use agent_coordinator::domain::agent::AgentStatus;
    ///
    /// assert!(AgentStatus::Idle.can_transition_to(AgentStatus::Busy));
    /// assert!(!AgentStatus::Busy.can_transition_to(AgentStatus::Busy));
    /// ```
    pub fn can_transition_to(&self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        matches!((self, next), (Idle, Busy) | (Busy, Idle))
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Busy => write!(f, "busy"),
        }
    }
}
