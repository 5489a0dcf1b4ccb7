// Task domain module
// Contains the task entity, its status and progress updates

#![allow(clippy::module_inception)]

pub mod task;
pub mod value_objects;

pub use task::Task;
pub use value_objects::{TaskStatus, TaskUpdate};
