use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::Agent;
use super::errors::{TransitionError, TransitionResult};
use super::halt::HaltInfo;
use super::task::{Task, TaskStatus};

/// Complete coordination state at one instant
///
/// A snapshot is always a detached copy. Every mutation is expressed as
/// "load a snapshot, apply one transition, commit it back", so the
/// transition methods here validate every precondition before touching
/// anything: a rejected transition leaves the snapshot unchanged.
///
/// # Invariants
/// - An agent is busy iff its `current_task_id` names an in-progress task
///   whose `agent_id` is that agent
/// - Tasks are never deleted; agents are deleted only by `remove_agent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    agents: HashMap<Uuid, Agent>,
    tasks: HashMap<Uuid, Task>,
    halt_info: HaltInfo,
}

impl Snapshot {
    // ===== Transitions =====

    pub fn register_agent(&mut self) -> Agent {
        let agent = Agent::enlist();
        self.agents.insert(agent.id(), agent.clone());
        agent
    }

    pub fn create_task(&mut self, prompt: String) -> Task {
        let task = Task::new(prompt);
        self.tasks.insert(task.id(), task.clone());
        task
    }

    /// Starts `task_id` on `agent_id` under the given name
    ///
    /// # Business Rules
    /// - Task must exist and be pending
    /// - Agent must exist and be idle
    /// - No other agent may already hold `name`
    pub fn assign_task(
        &mut self,
        task_id: Uuid,
        agent_id: Uuid,
        name: String,
    ) -> TransitionResult<()> {
        let task = self
            .tasks
            .get(&task_id)
            .ok_or(TransitionError::TaskNotFound(task_id))?;
        if task.status() != TaskStatus::Pending {
            return Err(TransitionError::TaskNotPending(task_id));
        }

        let agent = self
            .agents
            .get(&agent_id)
            .ok_or(TransitionError::AgentNotFound(agent_id))?;
        if !agent.is_idle() {
            return Err(TransitionError::AgentBusy(agent_id));
        }

        if self.name_taken_by_other(&name, agent_id) {
            return Err(TransitionError::NameTaken(name));
        }

        // Both sides were validated above, so neither call can fail halfway
        if let Some(task) = self.tasks.get_mut(&task_id) {
            task.start(agent_id)?;
        }
        if let Some(agent) = self.agents.get_mut(&agent_id) {
            agent.assign(task_id, name)?;
        }
        Ok(())
    }

    /// Creates a task and starts it on the first idle agent, in one step
    ///
    /// The name must not be held by any agent, idle or busy. Nothing is
    /// created when no agent is free or the name is taken.
    pub fn delegate(&mut self, prompt: String, name: String) -> TransitionResult<(Task, Agent)> {
        if self.agents.values().any(|a| a.name() == Some(name.as_str())) {
            return Err(TransitionError::NameTaken(name));
        }

        let agent_id = self
            .available_agents()
            .first()
            .map(|a| a.id())
            .ok_or(TransitionError::NoAvailableAgent)?;

        let task_id = self.create_task(prompt).id();
        self.assign_task(task_id, agent_id, name)?;

        match (self.tasks.get(&task_id), self.agents.get(&agent_id)) {
            (Some(task), Some(agent)) => Ok((task.clone(), agent.clone())),
            _ => Err(TransitionError::TaskNotFound(task_id)),
        }
    }

    pub fn record_update(&mut self, task_id: Uuid, message: String) -> TransitionResult<()> {
        self.tasks
            .get_mut(&task_id)
            .ok_or(TransitionError::TaskNotFound(task_id))?
            .record_update(message)
    }

    /// Completes a running task and frees the agent working on it
    pub fn complete_task(&mut self, task_id: Uuid, result: String) -> TransitionResult<()> {
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(TransitionError::TaskNotFound(task_id))?;
        task.complete(result)?;

        if let Some(agent_id) = task.agent_id() {
            if let Some(agent) = self.agents.get_mut(&agent_id) {
                if agent.current_task_id() == Some(task_id) {
                    agent.release();
                }
            }
        }
        Ok(())
    }

    /// Deletes an agent record, busy or not
    ///
    /// A busy agent's task stays in progress with nobody left to finish it.
    pub fn remove_agent(&mut self, agent_id: Uuid) -> TransitionResult<Agent> {
        self.agents
            .remove(&agent_id)
            .ok_or(TransitionError::AgentNotFound(agent_id))
    }

    pub fn raise_halt(&mut self, reason: String) -> HaltInfo {
        self.halt_info = HaltInfo::raised(reason);
        self.halt_info.clone()
    }

    pub fn clear_halt(&mut self) {
        self.halt_info = HaltInfo::default();
    }

    // ===== Queries =====

    pub fn agent(&self, agent_id: Uuid) -> Option<&Agent> {
        self.agents.get(&agent_id)
    }

    /// All agents, oldest enlistment first
    pub fn agents(&self) -> Vec<&Agent> {
        let mut agents: Vec<&Agent> = self.agents.values().collect();
        agents.sort_by_key(|a| (a.enlisted_at(), a.id()));
        agents
    }

    pub fn available_agents(&self) -> Vec<&Agent> {
        self.agents().into_iter().filter(|a| a.is_idle()).collect()
    }

    /// First agent carrying `name`. Collisions are not resolved here.
    pub fn agent_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents().into_iter().find(|a| a.name() == Some(name))
    }

    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// All tasks, oldest first
    pub fn tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.values().collect();
        tasks.sort_by_key(|t| (t.created_at(), t.id()));
        tasks
    }

    pub fn tasks_for_agent(&self, agent_id: Uuid) -> Vec<&Task> {
        self.tasks()
            .into_iter()
            .filter(|t| t.agent_id() == Some(agent_id))
            .collect()
    }

    pub fn halt_info(&self) -> &HaltInfo {
        &self.halt_info
    }

    pub fn is_halted(&self) -> bool {
        self.halt_info.halted
    }

    fn name_taken_by_other(&self, name: &str, agent_id: Uuid) -> bool {
        self.agents
            .values()
            .any(|a| a.id() != agent_id && a.name() == Some(name))
    }
}
