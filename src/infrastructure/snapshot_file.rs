//! Durable snapshot document
//!
//! Reads tolerate a missing or corrupt document by starting fresh. Writes
//! go to a staging file in the same directory which is then renamed over
//! the document, so readers see either the old or the new snapshot and a
//! crash mid-write leaves the old one intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::errors::CoordinationResult;
use crate::domain::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current snapshot
    ///
    /// # Returns
    /// * `Ok(Snapshot)` - Persisted state, or an empty snapshot when the
    ///   document is missing or cannot be parsed
    /// * `Err(io::Error)` - The document exists but could not be read
    pub async fn load(&self) -> std::io::Result<Snapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Coordination state is corrupt, starting fresh"
                );
                Ok(Snapshot::default())
            }
        }
    }

    /// Atomically replaces the persisted snapshot
    pub async fn commit(&self, snapshot: &Snapshot) -> CoordinationResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.ensure_parent_dir().await?;

        let staging = self.staging_path();
        let written = async {
            let mut file = tokio::fs::File::create(&staging).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            tokio::fs::rename(&staging, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn ensure_parent_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await
            }
            _ => Ok(()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("state.json");
        self.path.with_file_name(format!(
            ".{}.{}.{}.tmp",
            name,
            std::process::id(),
            Uuid::new_v4().simple()
        ))
    }
}
