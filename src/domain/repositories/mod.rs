// Repository ports (interfaces implemented by infrastructure adapters)

pub mod coordination_store;

pub use coordination_store::{CoordinationStore, Mutation};
