//! Project model - groups tasks under one team.

use serde::{Deserialize, Serialize};
use crate::id::{OwnerId, ProjectId, TeamId};
use crate::Time;

/// A project groups tasks and is staffed by exactly one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Description
    pub description: String,

    /// Team working on the project
    pub team: TeamId,

    /// Who owns the project
    pub owner: OwnerId,

    /// When created
    pub created_at: Time,
}

impl Project {
    /// Create a new project for `team`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        team: TeamId,
        owner: OwnerId,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description: description.into(),
            team,
            owner,
            created_at: chrono::Utc::now(),
        }
    }
}
