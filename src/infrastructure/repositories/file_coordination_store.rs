use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::CoordinationResult;
use crate::domain::repositories::{CoordinationStore, Mutation};
use crate::domain::snapshot::Snapshot;
use crate::infrastructure::lock_file::{LockFile, LockOptions};
use crate::infrastructure::snapshot_file::SnapshotFile;

/// File-backed implementation of CoordinationStore
///
/// Shares state between any number of processes on one host through a
/// JSON document and a co-located `.lock` marker. Mutations are
/// serialized by the marker; reads go straight to the document and rely
/// on atomic commits instead of the lock.
pub struct FileCoordinationStore {
    file: SnapshotFile,
    lock_path: PathBuf,
    lock_options: LockOptions,
}

impl FileCoordinationStore {
    /// Creates a store over the document at `state_path`
    ///
    /// # Arguments
    /// * `state_path` - Location of the JSON document; its directory is created on first write
    /// * `lock_options` - Staleness and retry bounds for the lock marker
    pub fn new(state_path: impl Into<PathBuf>, lock_options: LockOptions) -> Self {
        let state_path = state_path.into();
        let mut lock_name = state_path.clone().into_os_string();
        lock_name.push(".lock");

        Self {
            file: SnapshotFile::new(state_path),
            lock_path: PathBuf::from(lock_name),
            lock_options,
        }
    }

    pub fn state_path(&self) -> &Path {
        self.file.path()
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

#[async_trait]
impl CoordinationStore for FileCoordinationStore {
    async fn load(&self) -> Snapshot {
        match self.file.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(
                    path = %self.file.path().display(),
                    error = %e,
                    "Failed to read coordination state"
                );
                Snapshot::default()
            }
        }
    }

    async fn mutate(&self, mutation: Mutation<'_>) -> CoordinationResult<()> {
        self.file.ensure_parent_dir().await?;
        let _guard = LockFile::acquire(&self.lock_path, &self.lock_options).await?;

        // Unlike `load`, a read failure here must not turn into an empty
        // snapshot that would then be committed over the real one
        let current = self.file.load().await?;
        let mut next = current.clone();
        mutation(&mut next);

        if next != current {
            self.file.commit(&next).await?;
        }
        Ok(())
    }
}
