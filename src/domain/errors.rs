use thiserror::Error;
use uuid::Uuid;

/// Reasons a lifecycle transition is rejected
///
/// These are expected outcomes when callers race each other, not faults.
/// The coordinator reports them as a plain `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Agent {0} is busy")]
    AgentBusy(Uuid),

    #[error("Task {0} is not pending")]
    TaskNotPending(Uuid),

    #[error("Task {0} is not in progress")]
    TaskNotInProgress(Uuid),

    #[error("Agent name '{0}' is already taken")]
    NameTaken(String),

    #[error("No idle agent is available")]
    NoAvailableAgent,
}

pub type TransitionResult<T> = Result<T, TransitionError>;

/// Failures of the shared store itself, as opposed to rejected transitions
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("Could not acquire lock {path} within {waited_ms} ms")]
    LockUnavailable { path: String, waited_ms: u128 },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store returned without applying the mutation")]
    MutationNotApplied,
}

impl CoordinationError {
    /// Lock contention clears up on its own; everything else needs attention
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoordinationError::LockUnavailable { .. })
    }
}

pub type CoordinationResult<T> = Result<T, CoordinationError>;
