//! Workload Management (Layer 2)
//!
//! Teams, projects and tasks, with assignment decisions delegated to the
//! balancing engine and recorded in the activity log.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod locks;
pub mod manager;
pub mod report;

pub use config::ManagerConfig;
pub use error::{EntityKind, Result, WorkError};
pub use locks::TeamLocks;
pub use manager::{MemberSpec, MemberUpdate, ProjectUpdate, TaskSpec, TaskUpdate, WorkloadManager};
pub use report::{
    AutoAssignment, CreatedTask, Dashboard, MemberInfo, MemberWorkload, RebalanceReport,
    RemovedMember, TeamWorkload,
};
