//! Agent Coordinator Library
//!
//! Shared-state coordination for a pool of worker processes ("agents")
//! that pull tasks from a persistent queue, report progress, return
//! results and obey a global halt. Processes share nothing but the
//! coordination store.

pub mod api;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod infrastructure;
