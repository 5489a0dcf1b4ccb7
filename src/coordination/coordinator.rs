use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::agent::Agent;
use crate::domain::errors::{CoordinationError, CoordinationResult, TransitionError, TransitionResult};
use crate::domain::repositories::CoordinationStore;
use crate::domain::snapshot::Snapshot;
use crate::domain::task::Task;

/// Default delay between checks while an agent waits for work
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Outcome of an atomic delegation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delegation {
    Assigned { task: Task, agent: Agent },
    NoAvailableAgent,
    NameTaken,
}

/// Lifecycle engine for agents and tasks
///
/// Every mutating operation is exactly one call into the store's mutation
/// gate: the snapshot is loaded, one transition is applied and the result
/// committed. Preconditions are re-checked against the snapshot loaded
/// under the gate, so racing callers resolve to one winner while the
/// others get `false`.
///
/// Reads bypass the gate and never fail.
#[derive(Clone)]
pub struct Coordinator {
    store: Arc<dyn CoordinationStore>,
    poll_interval: Duration,
}

impl Coordinator {
    pub fn new(store: Arc<dyn CoordinationStore>) -> Self {
        Self {
            store,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // ===== Mutating operations =====

    pub async fn register_agent(&self) -> CoordinationResult<Agent> {
        let agent = self.with_exclusive_access(|s| s.register_agent()).await?;
        tracing::info!(agent_id = %agent.id(), "Agent registered");
        Ok(agent)
    }

    pub async fn create_task(&self, prompt: impl Into<String>) -> CoordinationResult<Task> {
        let prompt = prompt.into();
        let task = self.with_exclusive_access(move |s| s.create_task(prompt)).await?;
        tracing::info!(task_id = %task.id(), "Task created");
        Ok(task)
    }

    /// Starts a pending task on an idle agent under the given name
    ///
    /// Returns `false` without changing anything when the task is not
    /// pending, the agent is missing or busy, or another agent already
    /// holds `name`.
    pub async fn assign_task_to_agent(
        &self,
        task_id: Uuid,
        agent_id: Uuid,
        name: impl Into<String>,
    ) -> CoordinationResult<bool> {
        let name = name.into();
        let outcome = self
            .with_exclusive_access(move |s| s.assign_task(task_id, agent_id, name))
            .await?;

        if outcome.is_ok() {
            tracing::info!(%task_id, %agent_id, "Task assigned");
        }
        Ok(accepted("assign_task_to_agent", outcome))
    }

    /// Creates a task and hands it to the first idle agent, atomically
    pub async fn delegate_task(
        &self,
        prompt: impl Into<String>,
        name: impl Into<String>,
    ) -> CoordinationResult<Delegation> {
        let (prompt, name) = (prompt.into(), name.into());
        let outcome = self
            .with_exclusive_access(move |s| s.delegate(prompt, name))
            .await?;

        Ok(match outcome {
            Ok((task, agent)) => {
                tracing::info!(task_id = %task.id(), agent_id = %agent.id(), "Task delegated");
                Delegation::Assigned { task, agent }
            }
            Err(TransitionError::NameTaken(name)) => {
                tracing::debug!(%name, "Delegation rejected, name taken");
                Delegation::NameTaken
            }
            Err(e) => {
                tracing::debug!(error = %e, "Delegation rejected");
                Delegation::NoAvailableAgent
            }
        })
    }

    pub async fn update_task_status(
        &self,
        task_id: Uuid,
        message: impl Into<String>,
    ) -> CoordinationResult<bool> {
        let message = message.into();
        let outcome = self
            .with_exclusive_access(move |s| s.record_update(task_id, message))
            .await?;
        Ok(accepted("update_task_status", outcome))
    }

    /// Completes a running task and returns its agent to the idle pool
    pub async fn complete_task(
        &self,
        task_id: Uuid,
        result: impl Into<String>,
    ) -> CoordinationResult<bool> {
        let result = result.into();
        let outcome = self
            .with_exclusive_access(move |s| s.complete_task(task_id, result))
            .await?;

        if outcome.is_ok() {
            tracing::info!(%task_id, "Task completed");
        }
        Ok(accepted("complete_task", outcome))
    }

    /// Deletes an agent even if it is busy; its task is left in progress
    pub async fn remove_agent(&self, agent_id: Uuid) -> CoordinationResult<bool> {
        let outcome = self
            .with_exclusive_access(move |s| s.remove_agent(agent_id))
            .await?;

        if let Ok(agent) = &outcome {
            tracing::info!(%agent_id, orphaned_task = ?agent.current_task_id(), "Agent removed");
        }
        Ok(accepted("remove_agent", outcome))
    }

    /// Wipes all agents, tasks and halt state
    pub async fn clear_state(&self) -> CoordinationResult<()> {
        self.with_exclusive_access(|s| *s = Snapshot::default())
            .await?;
        tracing::warn!("Coordination state cleared");
        Ok(())
    }

    // ===== Read accessors =====

    /// Detached copy of the whole state
    pub async fn snapshot(&self) -> Snapshot {
        self.store.load().await
    }

    pub async fn get_agent(&self, agent_id: Uuid) -> Option<Agent> {
        self.store.load().await.agent(agent_id).cloned()
    }

    pub async fn get_all_agents(&self) -> Vec<Agent> {
        owned(self.store.load().await.agents())
    }

    pub async fn get_available_agents(&self) -> Vec<Agent> {
        owned(self.store.load().await.available_agents())
    }

    pub async fn find_agent_by_name(&self, name: &str) -> Option<Agent> {
        self.store.load().await.agent_by_name(name).cloned()
    }

    pub async fn get_task(&self, task_id: Uuid) -> Option<Task> {
        self.store.load().await.task(task_id).cloned()
    }

    pub async fn get_all_tasks(&self) -> Vec<Task> {
        owned(self.store.load().await.tasks())
    }

    pub async fn get_tasks_for_agent(&self, agent_id: Uuid) -> Vec<Task> {
        owned(self.store.load().await.tasks_for_agent(agent_id))
    }

    /// Runs `f` against the current snapshot under exclusive access and
    /// commits whatever it leaves behind
    pub(crate) async fn with_exclusive_access<R, F>(&self, f: F) -> CoordinationResult<R>
    where
        F: FnOnce(&mut Snapshot) -> R + Send,
        R: Send,
    {
        let mut output = None;
        self.store
            .mutate(Box::new(|snapshot: &mut Snapshot| {
                output = Some(f(snapshot));
            }))
            .await?;
        output.ok_or(CoordinationError::MutationNotApplied)
    }

    pub(crate) fn store(&self) -> &dyn CoordinationStore {
        self.store.as_ref()
    }
}

fn accepted<T>(operation: &str, outcome: TransitionResult<T>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(operation, error = %e, "Transition rejected");
            false
        }
    }
}

fn owned<T: Clone>(items: Vec<&T>) -> Vec<T> {
    items.into_iter().cloned().collect()
}
