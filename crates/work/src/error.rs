//! Errors returned by the workload manager.

use crewload_core::TeamId;
use crewload_storage::StorageError;

/// Result alias for manager operations.
pub type Result<T> = std::result::Result<T, WorkError>;

/// Kinds of entity an error can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A team
    Team,
    /// A team member
    Member,
    /// A project
    Project,
    /// A task
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Team => "Team",
            EntityKind::Member => "Team member",
            EntityKind::Project => "Project",
            EntityKind::Task => "Task",
        })
    }
}

/// Failures of a manager operation.
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    /// Referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up
        kind: EntityKind,
        /// The id that was looked up
        id: String,
    },

    /// Referenced entity belongs to someone else
    #[error("Not authorized to access {kind} {id}")]
    Forbidden {
        /// What was accessed
        kind: EntityKind,
        /// Its id
        id: String,
    },

    /// Auto-assignment found an empty team
    #[error("No team members available for assignment in team {team}")]
    NoCandidates {
        /// The empty team
        team: TeamId,
    },

    /// Input rejected before reaching the engine
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WorkError {
    pub(crate) fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    pub(crate) fn forbidden(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::Forbidden { kind, id: id.to_string() }
    }
}
