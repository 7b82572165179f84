//! Agent assignment for paid files.

mod service;

pub use service::{AgentSelector, AssignmentService, RandomSelector};
