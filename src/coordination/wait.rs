use serde::Serialize;
use uuid::Uuid;

use super::coordinator::Coordinator;
use crate::domain::snapshot::Snapshot;
use crate::domain::task::{Task, TaskStatus};

/// How a wait for work ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum WaitOutcome {
    /// The agent has been given this task
    Task { task: Task },
    /// The agent record no longer exists
    Removed,
    /// A halt was raised; the agent must stop
    Halted { reason: Option<String> },
}

impl WaitOutcome {
    /// Checks one snapshot for a terminal condition
    ///
    /// Halt wins over removal, which wins over assignment.
    pub fn resolve(snapshot: &Snapshot, agent_id: Uuid) -> Option<Self> {
        if snapshot.is_halted() {
            return Some(WaitOutcome::Halted {
                reason: snapshot.halt_info().reason.clone(),
            });
        }

        let agent = match snapshot.agent(agent_id) {
            Some(agent) => agent,
            None => return Some(WaitOutcome::Removed),
        };

        agent
            .current_task_id()
            .and_then(|task_id| snapshot.task(task_id))
            .filter(|task| task.status() == TaskStatus::InProgress)
            .map(|task| WaitOutcome::Task { task: task.clone() })
    }
}

impl Coordinator {
    /// Suspends until the agent is assigned a task, removed, or halted
    ///
    /// Polls the store without taking the lock, so waiting agents never
    /// hold up writers. There is no timeout; callers that need one wrap
    /// this future themselves.
    pub async fn wait_for_task(&self, agent_id: Uuid) -> WaitOutcome {
        let mut polls: u64 = 0;
        loop {
            let snapshot = self.store().load().await;
            if let Some(outcome) = WaitOutcome::resolve(&snapshot, agent_id) {
                tracing::debug!(%agent_id, polls, ?outcome, "Wait resolved");
                return outcome;
            }

            polls += 1;
            tokio::time::sleep(self.poll_interval()).await;
        }
    }
}
