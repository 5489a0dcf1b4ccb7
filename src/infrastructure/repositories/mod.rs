// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod file_coordination_store;
pub mod in_memory_coordination_store;

pub use file_coordination_store::FileCoordinationStore;
pub use in_memory_coordination_store::InMemoryCoordinationStore;
