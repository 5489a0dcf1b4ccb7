// Agent domain module
// Contains the agent entity and its status value object

#![allow(clippy::module_inception)]

pub mod agent;
pub mod value_objects;

pub use agent::Agent;
pub use value_objects::AgentStatus;
