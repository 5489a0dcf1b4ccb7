use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::errors::CoordinationResult;
use crate::domain::repositories::{CoordinationStore, Mutation};
use crate::domain::snapshot::Snapshot;

/// In-process implementation of CoordinationStore
///
/// Suitable for embedding the coordinator in a single process and for
/// tests. State is lost when the process exits.
#[derive(Default)]
pub struct InMemoryCoordinationStore {
    state: RwLock<Snapshot>,
}

impl InMemoryCoordinationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoordinationStore for InMemoryCoordinationStore {
    async fn load(&self) -> Snapshot {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn mutate(&self, mutation: Mutation<'_>) -> CoordinationResult<()> {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Apply to a copy so a panicking mutation cannot leave a torn state
        let mut next = state.clone();
        mutation(&mut next);
        *state = next;
        Ok(())
    }
}
