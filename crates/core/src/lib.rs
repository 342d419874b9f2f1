//! Crewload core data models.
//!
//! This crate defines the teams, members, projects, tasks and assignment
//! events that the balancing engine works over.

#![warn(missing_docs)]

// Core identities
mod id;

// Teams and projects
mod team;
mod project;

// Tasks and their audit trail
mod task;
mod event;

// Re-exports
pub use id::*;

pub use team::{Capacity, Member, Team};
pub use project::Project;
pub use task::{
    MemberFilter, ParseError, Priority, Task, TaskFilter, TaskStatus, UNASSIGNED,
};
pub use event::{AssignmentAction, AssignmentEvent};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
