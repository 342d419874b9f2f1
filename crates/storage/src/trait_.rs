//! Storage trait abstraction.

use async_trait::async_trait;
use crewload_core::{
    AssignmentEvent, Member, MemberId, OwnerId, Project, ProjectId, Task, TaskFilter, TaskId,
    Team, TeamId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Write-only destination for assignment audit records.
///
/// Records are appended in the order they are handed over and never changed
/// afterwards.
#[async_trait]
pub trait ActivitySink: Send {
    /// Append one record.
    async fn append_activity(&mut self, event: &AssignmentEvent) -> Result<()>;
}

/// Storage abstraction for Crewload data.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait Storage: ActivitySink + Send + Sync {
    // === Team operations ===

    /// Save a team (create or update), roster included.
    async fn save_team(&mut self, team: &Team) -> Result<()>;

    /// Load a team by ID.
    async fn load_team(&self, id: TeamId) -> Result<Option<Team>>;

    /// List teams of an owner, oldest first.
    async fn list_teams(&self, owner: &OwnerId) -> Result<Vec<Team>>;

    /// Delete a team.
    async fn delete_team(&mut self, id: TeamId) -> Result<()>;

    // === Project operations ===

    /// Save a project (create or update).
    async fn save_project(&mut self, project: &Project) -> Result<()>;

    /// Load a project by ID.
    async fn load_project(&self, id: ProjectId) -> Result<Option<Project>>;

    /// List projects of an owner, oldest first.
    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>>;

    /// List the projects staffed by a team, oldest first.
    async fn list_team_projects(&self, team: TeamId) -> Result<Vec<Project>>;

    /// Delete a project.
    async fn delete_project(&mut self, id: ProjectId) -> Result<()>;

    // === Task operations ===

    /// Save a task (create or update).
    async fn save_task(&mut self, task: &Task) -> Result<()>;

    /// Load a task by ID.
    async fn load_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// List tasks matching the filter, ordered by creation time then id.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Delete a task.
    async fn delete_task(&mut self, id: TaskId) -> Result<()>;

    /// Set or clear a task's assignee, updating the id and name together.
    async fn assign_task(&mut self, id: TaskId, member: Option<&Member>) -> Result<Task> {
        let mut task = self
            .load_task(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("task {}", id)))?;
        match member {
            Some(member) => task.assign_to(member),
            None => task.unassign(),
        }
        self.save_task(&task).await?;
        Ok(task)
    }

    /// Clear the assignee of every task held by `member`. Returns how many
    /// tasks were changed.
    async fn unassign_member_tasks(&mut self, member: MemberId) -> Result<usize>;

    // === Activity operations ===

    /// Most recent activity of an owner, newest first.
    async fn list_activity(&self, owner: &OwnerId, limit: usize) -> Result<Vec<AssignmentEvent>>;
}
