// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod agent;
pub mod errors;
pub mod halt;
pub mod repositories;
pub mod snapshot;
pub mod task;

pub use halt::HaltInfo;
pub use snapshot::Snapshot;
