// Infrastructure layer module
// Contains storage adapters for the coordination state
// Follows Hexagonal Architecture

pub mod lock_file;
pub mod repositories;
pub mod snapshot_file;

pub use lock_file::{LockFile, LockOptions};
pub use snapshot_file::SnapshotFile;
