// Coordination engine
//
// Lifecycle transitions for agents and tasks, the blocking wait used by
// idle agents, and the halt broadcast. All state lives behind a
// CoordinationStore; nothing here is shared in memory between agents.

pub mod coordinator;
pub mod halt;
pub mod wait;

pub use crate::domain::errors::{CoordinationError, CoordinationResult};
pub use coordinator::{Coordinator, Delegation, DEFAULT_POLL_INTERVAL};
pub use wait::WaitOutcome;
