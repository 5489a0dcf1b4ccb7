use async_trait::async_trait;

use crate::domain::errors::CoordinationResult;
use crate::domain::snapshot::Snapshot;

/// One read-modify-write step applied to the current snapshot
pub type Mutation<'a> = Box<dyn FnOnce(&mut Snapshot) + Send + 'a>;

/// Repository trait for the shared coordination state
///
/// Implementations own the storage backend and its locking discipline.
/// The lifecycle engine only ever sees whole snapshots.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Lock-free read of the current snapshot
    ///
    /// Never fails: missing or unreadable state yields an empty snapshot.
    /// Concurrent commits are never observed half-written.
    async fn load(&self) -> Snapshot;

    /// Apply `mutation` under exclusive access and commit the result
    ///
    /// At most one mutation is in flight per store at any time, across
    /// every process sharing it. The mutation is invoked exactly once
    /// unless an error is returned.
    async fn mutate(&self, mutation: Mutation<'_>) -> CoordinationResult<()>;
}
