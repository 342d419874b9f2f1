//! In-memory storage backend.

use async_trait::async_trait;
use crewload_core::{
    AssignmentEvent, MemberId, OwnerId, Project, ProjectId, Task, TaskFilter, TaskId, Team,
    TeamId,
};
use super::{ActivitySink, Result, Storage};

/// Storage that keeps everything in insertion-ordered vectors.
///
/// Listing order is insertion order, which makes snapshots built from it
/// fully deterministic.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    teams: Vec<Team>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    activity: Vec<AssignmentEvent>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every appended activity record, oldest first.
    pub fn activity(&self) -> &[AssignmentEvent] {
        &self.activity
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = item.clone(),
        None => items.push(item.clone()),
    }
}

#[async_trait]
impl ActivitySink for MemoryStorage {
    async fn append_activity(&mut self, event: &AssignmentEvent) -> Result<()> {
        self.activity.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_team(&mut self, team: &Team) -> Result<()> {
        upsert(&mut self.teams, team, |t| t.id == team.id);
        Ok(())
    }

    async fn load_team(&self, id: TeamId) -> Result<Option<Team>> {
        Ok(self.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn list_teams(&self, owner: &OwnerId) -> Result<Vec<Team>> {
        Ok(self.teams.iter().filter(|t| &t.owner == owner).cloned().collect())
    }

    async fn delete_team(&mut self, id: TeamId) -> Result<()> {
        self.teams.retain(|t| t.id != id);
        Ok(())
    }

    async fn save_project(&mut self, project: &Project) -> Result<()> {
        upsert(&mut self.projects, project, |p| p.id == project.id);
        Ok(())
    }

    async fn load_project(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>> {
        Ok(self.projects.iter().filter(|p| &p.owner == owner).cloned().collect())
    }

    async fn list_team_projects(&self, team: TeamId) -> Result<Vec<Project>> {
        Ok(self.projects.iter().filter(|p| p.team == team).cloned().collect())
    }

    async fn delete_project(&mut self, id: ProjectId) -> Result<()> {
        self.projects.retain(|p| p.id != id);
        Ok(())
    }

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        upsert(&mut self.tasks, task, |t| t.id == task.id);
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self.tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    async fn unassign_member_tasks(&mut self, member: MemberId) -> Result<usize> {
        let mut changed = 0;
        for task in self.tasks.iter_mut().filter(|t| t.assigned_member == Some(member)) {
            task.unassign();
            changed += 1;
        }
        Ok(changed)
    }

    async fn list_activity(&self, owner: &OwnerId, limit: usize) -> Result<Vec<AssignmentEvent>> {
        Ok(self
            .activity
            .iter()
            .rev()
            .filter(|e| &e.owner == owner)
            .take(limit)
            .cloned()
            .collect())
    }
}
