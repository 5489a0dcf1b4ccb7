//! Cross-process lock marker
//!
//! The lock is a file created with create-new semantics next to the state
//! document. Whoever manages to create it holds the lock until the guard
//! drops. A marker older than the staleness bound belongs to a holder that
//! died and is reclaimed.
//!
//! Every marker carries a random owner token. A guard only ever deletes a
//! marker that still carries its own token, and a reclaim only goes ahead
//! when the marker it moved aside is the stale one it inspected. Reclaims
//! are serialized by a second, short-lived `<lock>.reclaim` marker.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::errors::{CoordinationError, CoordinationResult};

/// Timing knobs for lock acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// Age after which an existing marker is considered abandoned
    pub stale_after: Duration,
    /// Delay between attempts while the lock is held elsewhere
    pub retry_interval: Duration,
    /// Give up after waiting this long
    pub acquire_timeout: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(10),
            retry_interval: Duration::from_millis(25),
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// On-disk contents of a lock marker
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockMarker {
    pid: u32,
    acquired_at: DateTime<Utc>,
    token: String,
}

/// Held lock; the marker is removed on drop if it is still ours
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    token: String,
}

impl LockFile {
    /// Acquires the lock at `path`, waiting up to `options.acquire_timeout`
    ///
    /// # Returns
    /// * `Ok(LockFile)` - Lock is held until the guard is dropped
    /// * `Err(CoordinationError::LockUnavailable)` - Still held elsewhere after the timeout
    /// * `Err(CoordinationError::Io)` - Marker could not be created or inspected
    pub async fn acquire(path: &Path, options: &LockOptions) -> CoordinationResult<Self> {
        let started = Instant::now();

        loop {
            if let Some(lock) = Self::try_lock(path).await? {
                return Ok(lock);
            }
            if reclaim_if_stale(path, options.stale_after).await? {
                continue;
            }

            if started.elapsed() >= options.acquire_timeout {
                return Err(CoordinationError::LockUnavailable {
                    path: path.display().to_string(),
                    waited_ms: started.elapsed().as_millis(),
                });
            }
            tokio::time::sleep(options.retry_interval).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Single attempt; `Ok(None)` when a marker already exists
    async fn try_lock(path: &Path) -> std::io::Result<Option<Self>> {
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(e),
        };

        let marker = LockMarker {
            pid: std::process::id(),
            acquired_at: Utc::now(),
            token: Uuid::new_v4().simple().to_string(),
        };
        let written = match serde_json::to_vec(&marker) {
            Ok(bytes) => match file.write_all(&bytes).await {
                Ok(()) => file.sync_all().await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e.into()),
        };

        // A marker without a token could never be released by its owner
        if let Err(e) = written {
            tracing::warn!(lock = %path.display(), error = %e, "Failed to write lock marker");
            drop(file);
            let _ = tokio::fs::remove_file(path).await;
            return Err(e);
        }

        Ok(Some(Self {
            path: path.to_path_buf(),
            token: marker.token,
        }))
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        match std::fs::read(&self.path) {
            Ok(bytes) if parse_token(&bytes).as_deref() == Some(self.token.as_str()) => {
                let _ = std::fs::remove_file(&self.path);
            }
            Ok(_) => tracing::warn!(
                lock = %self.path.display(),
                "Lock marker was reclaimed while held; leaving the current one in place"
            ),
            Err(_) => {}
        }
    }
}

/// Returns `true` when the caller should retry immediately
async fn reclaim_if_stale(path: &Path, stale_after: Duration) -> CoordinationResult<bool> {
    match marker_age(path).await? {
        None => return Ok(true),
        Some(age) if age < stale_after => return Ok(false),
        Some(_) => {}
    }

    let guard_path = reclaim_guard_path(path);
    let Some(_reclaiming) = LockFile::try_lock(&guard_path).await? else {
        // Another contender is reclaiming. Its guard is only left behind if
        // that contender died mid-reclaim.
        if matches!(marker_age(&guard_path).await?, Some(age) if age >= stale_after) {
            tracing::warn!(lock = %guard_path.display(), "Removing abandoned reclaim marker");
            let _ = tokio::fs::remove_file(&guard_path).await;
        }
        return Ok(false);
    };

    // Someone may have finished a reclaim and acquired since the first look
    let age = match marker_age(path).await? {
        None => return Ok(true),
        Some(age) if age < stale_after => return Ok(false),
        Some(age) => age,
    };
    let observed = read_token(path).await?;

    let tombstone = stale_marker_path(path);
    match tokio::fs::rename(path, &tombstone).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    }

    if read_token(&tombstone).await? != observed {
        // The stale holder released and a new holder acquired in between,
        // so what we moved aside is a live lock
        if let Err(e) = tokio::fs::hard_link(&tombstone, path).await {
            tracing::error!(
                lock = %path.display(),
                error = %e,
                "Failed to restore a live lock marker"
            );
        }
        let _ = tokio::fs::remove_file(&tombstone).await;
        return Ok(false);
    }

    tracing::warn!(
        lock = %path.display(),
        age_ms = age.as_millis() as u64,
        "Reclaimed stale coordination lock"
    );
    let _ = tokio::fs::remove_file(&tombstone).await;
    Ok(true)
}

/// Age of the marker at `path` by mtime, `None` when there is none
async fn marker_age(path: &Path) -> std::io::Result<Option<Duration>> {
    let modified = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.modified()?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    ))
}

/// Owner token of the marker at `path`
///
/// Markers with missing or unreadable contents have no token.
async fn read_token(path: &Path) -> std::io::Result<Option<String>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(parse_token(&bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse_token(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<LockMarker>(bytes)
        .ok()
        .map(|marker| marker.token)
}

fn reclaim_guard_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".reclaim");
    PathBuf::from(name)
}

fn stale_marker_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("coordination.lock");
    path.with_file_name(format!(".{}.{}.stale", name, Uuid::new_v4().simple()))
}
