//! JSON file storage implementation.
//!
//! Stores data as JSON files in a `.crewload` directory and keeps small
//! per-object meta markers (version + updated_at). Activity records are
//! written once and never rewritten.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use crewload_core::{
    AssignmentEvent, EventId, MemberId, OwnerId, Project, ProjectId, Task, TaskFilter, TaskId,
    Team, TeamId,
};
use super::{ActivitySink, Storage, Result};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    writes: Arc<Mutex<u64>>,
}

impl JsonStorage {
    /// Create storage, creating the data and meta subdirectories under
    /// `root` when they are missing.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for kind in ["teams", "projects", "tasks", "activity"] {
            fs::create_dir_all(root.join(kind)).await?;
            fs::create_dir_all(root.join("meta").join(kind)).await?;
        }

        Ok(Self {
            root,
            writes: Arc::new(Mutex::new(0)),
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files written through this handle.
    pub async fn writes(&self) -> u64 {
        *self.writes.lock().await
    }

    fn team_path(&self, id: TeamId) -> PathBuf {
        self.root.join("teams").join(format!("{}.json", id))
    }
    fn project_path(&self, id: ProjectId) -> PathBuf {
        self.root.join("projects").join(format!("{}.json", id))
    }
    fn task_path(&self, id: TaskId) -> PathBuf {
        self.root.join("tasks").join(format!("{}.json", id))
    }
    fn activity_path(&self, id: EventId) -> PathBuf {
        self.root.join("activity").join(format!("{}.json", id))
    }

    fn meta_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join("meta").join(kind).join(format!("{}.meta.json", id))
    }

    async fn write_entity<T: serde::Serialize>(
        &self,
        kind: &str,
        id: &str,
        path: &Path,
        value: &T,
    ) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json.as_bytes()).await?;
        let version = self.bump_version(kind, id).await?;
        debug!(kind, id, version, "wrote entity");
        *self.writes.lock().await += 1;
        Ok(())
    }

    /// Read and increment per-object version, return new version.
    async fn bump_version(&self, kind: &str, id: &str) -> Result<u64> {
        let path = self.meta_path(kind, id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    async fn remove_entity(&self, kind: &str, id: &str, path: &Path) -> Result<()> {
        remove_if_exists(path).await?;
        remove_if_exists(&self.meta_path(kind, id)).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivitySink for JsonStorage {
    async fn append_activity(&mut self, event: &AssignmentEvent) -> Result<()> {
        let id = event.id.to_string();
        self.write_entity("activity", &id, &self.activity_path(event.id), event)
            .await
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_team(&mut self, team: &Team) -> Result<()> {
        let id = team.id.to_string();
        self.write_entity("teams", &id, &self.team_path(team.id), team).await
    }

    async fn load_team(&self, id: TeamId) -> Result<Option<Team>> {
        read_json(&self.team_path(id)).await
    }

    async fn list_teams(&self, owner: &OwnerId) -> Result<Vec<Team>> {
        let mut teams: Vec<Team> = list_dir(&self.root.join("teams")).await?;
        teams.retain(|t| &t.owner == owner);
        teams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(teams)
    }

    async fn delete_team(&mut self, id: TeamId) -> Result<()> {
        self.remove_entity("teams", &id.to_string(), &self.team_path(id)).await
    }

    async fn save_project(&mut self, project: &Project) -> Result<()> {
        let id = project.id.to_string();
        self.write_entity("projects", &id, &self.project_path(project.id), project)
            .await
    }

    async fn load_project(&self, id: ProjectId) -> Result<Option<Project>> {
        read_json(&self.project_path(id)).await
    }

    async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>> {
        let mut projects = self.all_projects().await?;
        projects.retain(|p| &p.owner == owner);
        Ok(projects)
    }

    async fn list_team_projects(&self, team: TeamId) -> Result<Vec<Project>> {
        let mut projects = self.all_projects().await?;
        projects.retain(|p| p.team == team);
        Ok(projects)
    }

    async fn delete_project(&mut self, id: ProjectId) -> Result<()> {
        self.remove_entity("projects", &id.to_string(), &self.project_path(id))
            .await
    }

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        let id = task.id.to_string();
        self.write_entity("tasks", &id, &self.task_path(task.id), task).await
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        read_json(&self.task_path(id)).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = list_dir(&self.root.join("tasks")).await?;
        tasks.retain(|t| filter.matches(t));
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.remove_entity("tasks", &id.to_string(), &self.task_path(id)).await
    }

    async fn unassign_member_tasks(&mut self, member: MemberId) -> Result<usize> {
        let tasks: Vec<Task> = list_dir(&self.root.join("tasks")).await?;
        let mut changed = 0;
        for mut task in tasks.into_iter().filter(|t| t.assigned_member == Some(member)) {
            task.unassign();
            self.save_task(&task).await?;
            changed += 1;
        }
        Ok(changed)
    }

    async fn list_activity(&self, owner: &OwnerId, limit: usize) -> Result<Vec<AssignmentEvent>> {
        let mut events: Vec<AssignmentEvent> = list_dir(&self.root.join("activity")).await?;
        events.retain(|e| &e.owner == owner);
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        events.truncate(limit);
        Ok(events)
    }
}

impl JsonStorage {
    async fn all_projects(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = list_dir(&self.root.join("projects")).await?;
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
    })?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let path = entry.path();
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewload_core::{AssignmentAction, Capacity, Member, MemberFilter};
    use tempfile::TempDir;

    async fn storage() -> (TempDir, JsonStorage) {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_team_roundtrip() {
        let (_dir, mut storage) = storage().await;
        let owner = OwnerId::local();
        let mut team = Team::new("Platform", owner.clone());
        team.add_member(Member::new("Alice", "Backend", Capacity::clamped(2)));

        storage.save_team(&team).await.unwrap();
        let loaded = storage.load_team(team.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Platform");
        assert_eq!(loaded.members, team.members);

        assert_eq!(storage.list_teams(&owner).await.unwrap().len(), 1);
        assert!(storage.list_teams(&OwnerId::new("other")).await.unwrap().is_empty());

        storage.delete_team(team.id).await.unwrap();
        assert!(storage.load_team(team.id).await.unwrap().is_none());
        // Deleting twice is fine
        storage.delete_team(team.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_meta_version_bumps() {
        let (dir, mut storage) = storage().await;
        let team = Team::new("Platform", OwnerId::local());
        storage.save_team(&team).await.unwrap();
        storage.save_team(&team).await.unwrap();

        let meta = dir
            .path()
            .join("meta")
            .join("teams")
            .join(format!("{}.meta.json", team.id));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(meta).unwrap()).unwrap();
        assert_eq!(json["version"], 2);
        assert_eq!(storage.writes().await, 2);
    }

    #[tokio::test]
    async fn test_tasks_filter_and_unassign() {
        let (_dir, mut storage) = storage().await;
        let owner = OwnerId::local();
        let member = Member::new("Alice", "Backend", Capacity::default());
        let project = ProjectId::new();

        let mut first = Task::new("First", "", project, owner.clone());
        first.assign_to(&member);
        let second = Task::new("Second", "", project, owner.clone());
        storage.save_task(&first).await.unwrap();
        storage.save_task(&second).await.unwrap();

        let filter = TaskFilter {
            member: Some(MemberFilter::Member(member.id)),
            ..TaskFilter::owned_by(owner.clone())
        };
        let assigned = storage.list_tasks(&filter).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].title, "First");

        let changed = storage.unassign_member_tasks(member.id).await.unwrap();
        assert_eq!(changed, 1);
        assert!(storage.list_tasks(&filter).await.unwrap().is_empty());

        let task = storage.load_task(first.id).await.unwrap().unwrap();
        assert_eq!(task.assigned_member_name, crewload_core::UNASSIGNED);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped() {
        let (dir, mut storage) = storage().await;
        let owner = OwnerId::local();
        let task = Task::new("Intact", "", ProjectId::new(), owner.clone());
        storage.save_task(&task).await.unwrap();
        std::fs::write(dir.path().join("tasks").join("broken.json"), "{ not json").unwrap();

        let tasks = storage.list_tasks(&TaskFilter::owned_by(owner)).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn test_assign_task_missing() {
        let (_dir, mut storage) = storage().await;
        let result = storage.assign_task(TaskId::new(), None).await;
        assert!(matches!(result, Err(crate::StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_activity_newest_first() {
        let (_dir, mut storage) = storage().await;
        let owner = OwnerId::local();
        let project = ProjectId::new();

        for title in ["one", "two", "three"] {
            let event = AssignmentEvent::new(
                AssignmentAction::Assigned,
                title,
                crewload_core::UNASSIGNED,
                "Alice",
                project,
                owner.clone(),
            );
            storage.append_activity(&event).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let recent = storage.list_activity(&owner, 2).await.unwrap();
        let titles: Vec<_> = recent.iter().map(|e| e.task_title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);
    }
}
