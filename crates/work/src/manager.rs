//! Workload management service.
//!
//! Loads team snapshots from storage, runs the balancing engine over them
//! and writes the resulting assignments and activity records back. Every
//! operation that decides an assignment holds the team's guard from the
//! first read to the last write.

use std::sync::Arc;
use crewload_balance::{
    member_loads, select_target, EventEmitter, MemberLoad, Rebalancer, TeamSnapshot,
};
use crewload_core::{
    AssignmentEvent, Capacity, Member, MemberFilter, MemberId, OwnerId, Priority, Project,
    ProjectId, Task, TaskFilter, TaskId, TaskStatus, Team, TeamId,
};
use crewload_storage::Storage;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::error::{EntityKind, Result, WorkError};
use crate::locks::TeamLocks;
use crate::report::{
    AutoAssignment, CreatedTask, Dashboard, MemberInfo, RebalanceReport, RemovedMember,
    TeamWorkload,
};

/// Specification for adding a member to a team.
#[derive(Debug, Clone)]
pub struct MemberSpec {
    /// Display name
    pub name: String,
    /// Free-form role
    pub role: String,
    /// Clamped into `0..=5`; defaults to 3
    pub capacity: Option<i64>,
}

impl MemberSpec {
    /// Member with the default capacity.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            capacity: None,
        }
    }

    /// Set the capacity.
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    fn into_member(self) -> Result<Member> {
        let capacity = self.capacity.map(clamp_capacity).unwrap_or_default();
        Ok(Member::new(
            require_text("member name", &self.name)?,
            require_text("member role", &self.role)?,
            capacity,
        ))
    }
}

/// Changes to a member. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    /// New name
    pub name: Option<String>,
    /// New role
    pub role: Option<String>,
    /// New capacity, clamped
    pub capacity: Option<i64>,
}

/// Specification for creating a task.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Title, required
    pub title: String,
    /// Description
    pub description: String,
    /// Owning project
    pub project: ProjectId,
    /// Initial assignee, a member of the project's team
    pub assigned_member: Option<MemberId>,
    /// Priority
    pub priority: Priority,
    /// Status
    pub status: TaskStatus,
}

impl TaskSpec {
    /// Unassigned, pending, medium-priority task.
    pub fn new(title: impl Into<String>, project: ProjectId) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            project,
            assigned_member: None,
            priority: Priority::default(),
            status: TaskStatus::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Assign on creation.
    pub fn assigned_to(mut self, member: MemberId) -> Self {
        self.assigned_member = Some(member);
        self
    }
}

/// Changes to a task. `None` leaves a field alone; `assigned_member:
/// Some(None)` unassigns.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New priority
    pub priority: Option<Priority>,
    /// New status
    pub status: Option<TaskStatus>,
    /// New assignee; `Some(None)` unassigns
    pub assigned_member: Option<Option<MemberId>>,
}

/// Changes to a project. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Team to move the project to
    pub team: Option<TeamId>,
}

fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn clamp_capacity(value: i64) -> Capacity {
    if !Capacity::in_range(value) {
        warn!("capacity {} out of range, clamping to 0..={}", value, Capacity::MAX);
    }
    Capacity::clamped(value)
}

/// The orchestration boundary around the balancing engine.
pub struct WorkloadManager<S: Storage> {
    storage: Arc<Mutex<S>>,
    locks: TeamLocks,
    rebalancer: Rebalancer,
    config: ManagerConfig,
}

impl<S: Storage> WorkloadManager<S> {
    /// Create a manager over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            locks: TeamLocks::new(),
            rebalancer: Rebalancer::new(),
            config: ManagerConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Shared handle to the underlying storage.
    pub fn storage(&self) -> Arc<Mutex<S>> {
        self.storage.clone()
    }

    // === Lookups ===

    async fn owned_team(&self, owner: &OwnerId, id: TeamId) -> Result<Team> {
        let team = self
            .storage
            .lock()
            .await
            .load_team(id)
            .await?
            .ok_or_else(|| WorkError::not_found(EntityKind::Team, id))?;
        if &team.owner != owner {
            return Err(WorkError::forbidden(EntityKind::Team, id));
        }
        Ok(team)
    }

    async fn owned_project(&self, owner: &OwnerId, id: ProjectId) -> Result<Project> {
        let project = self
            .storage
            .lock()
            .await
            .load_project(id)
            .await?
            .ok_or_else(|| WorkError::not_found(EntityKind::Project, id))?;
        if &project.owner != owner {
            return Err(WorkError::forbidden(EntityKind::Project, id));
        }
        Ok(project)
    }

    async fn owned_task(&self, owner: &OwnerId, id: TaskId) -> Result<Task> {
        let task = self
            .storage
            .lock()
            .await
            .load_task(id)
            .await?
            .ok_or_else(|| WorkError::not_found(EntityKind::Task, id))?;
        if &task.owner != owner {
            return Err(WorkError::forbidden(EntityKind::Task, id));
        }
        Ok(task)
    }

    async fn project_team(&self, project: &Project) -> Result<Team> {
        self.storage
            .lock()
            .await
            .load_team(project.team)
            .await?
            .ok_or_else(|| WorkError::not_found(EntityKind::Team, project.team))
    }

    async fn stored_project(&self, id: ProjectId) -> Result<Project> {
        self.storage
            .lock()
            .await
            .load_project(id)
            .await?
            .ok_or_else(|| WorkError::not_found(EntityKind::Project, id))
    }

    /// Take the guard of the team that staffs `project`, re-reading the
    /// project under the guard until its team is stable.
    async fn lock_project_team(&self, project: ProjectId) -> Result<(OwnedMutexGuard<()>, Project)> {
        let mut team = self.stored_project(project).await?.team;
        loop {
            let guard = self.locks.lock(team).await;
            let current = self.stored_project(project).await?;
            if current.team == team {
                return Ok((guard, current));
            }
            debug!(project = %project, "project moved to team {} while waiting", current.team);
            team = current.team;
        }
    }

    /// Like `lock_project_team`, but `None` once the project is gone. Tasks
    /// left behind by a deleted project belong to no team.
    async fn lock_task_team(&self, project: ProjectId) -> Result<Option<(OwnedMutexGuard<()>, Project)>> {
        match self.lock_project_team(project).await {
            Ok(locked) => Ok(Some(locked)),
            Err(WorkError::NotFound { kind: EntityKind::Project, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Guards of two teams, always taken in id order.
    async fn lock_team_pair(&self, a: TeamId, b: TeamId) -> Vec<OwnedMutexGuard<()>> {
        let mut ids = vec![a, b];
        ids.sort();
        ids.dedup();
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.locks.lock(id).await);
        }
        guards
    }

    async fn owner_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>> {
        Ok(self
            .storage
            .lock()
            .await
            .list_tasks(&TaskFilter::owned_by(owner.clone()))
            .await?)
    }

    // === Teams and members ===

    /// Create a team with an initial roster.
    pub async fn create_team(
        &self,
        owner: &OwnerId,
        name: &str,
        members: Vec<MemberSpec>,
    ) -> Result<Team> {
        let mut team = Team::new(require_text("team name", name)?, owner.clone());
        for spec in members {
            team.add_member(spec.into_member()?);
        }
        self.storage.lock().await.save_team(&team).await?;
        info!(team = %team.id, members = team.members.len(), "created team {}", team.name);
        Ok(team)
    }

    /// Teams of an owner.
    pub async fn list_teams(&self, owner: &OwnerId) -> Result<Vec<Team>> {
        Ok(self.storage.lock().await.list_teams(owner).await?)
    }

    /// One team.
    pub async fn team(&self, owner: &OwnerId, id: TeamId) -> Result<Team> {
        self.owned_team(owner, id).await
    }

    /// Rename a team.
    pub async fn update_team(&self, owner: &OwnerId, id: TeamId, name: &str) -> Result<Team> {
        let name = require_text("team name", name)?;
        let _guard = self.locks.lock(id).await;
        let mut team = self.owned_team(owner, id).await?;
        team.name = name;
        self.storage.lock().await.save_team(&team).await?;
        info!(team = %id, "renamed team to {}", team.name);
        Ok(team)
    }

    /// Delete a team. Its projects and tasks are left in place.
    pub async fn delete_team(&self, owner: &OwnerId, id: TeamId) -> Result<()> {
        {
            let _guard = self.locks.lock(id).await;
            self.owned_team(owner, id).await?;
            self.storage.lock().await.delete_team(id).await?;
        }
        self.locks.forget(id).await;
        info!(team = %id, "deleted team");
        Ok(())
    }

    /// Add a member to a team.
    pub async fn add_member(&self, owner: &OwnerId, team_id: TeamId, spec: MemberSpec) -> Result<Team> {
        let _guard = self.locks.lock(team_id).await;
        let mut team = self.owned_team(owner, team_id).await?;
        let member = team.add_member(spec.into_member()?).clone();
        self.storage.lock().await.save_team(&team).await?;
        info!(team = %team.id, member = %member.id, capacity = %member.capacity, "added member {}", member.name);
        Ok(team)
    }

    /// Change a member's name, role or capacity.
    ///
    /// A rename is carried over to the name label of the member's tasks.
    pub async fn update_member(
        &self,
        owner: &OwnerId,
        team_id: TeamId,
        member_id: MemberId,
        update: MemberUpdate,
    ) -> Result<Team> {
        let _guard = self.locks.lock(team_id).await;
        let mut team = self.owned_team(owner, team_id).await?;
        let member = team
            .member_mut(member_id)
            .ok_or_else(|| WorkError::not_found(EntityKind::Member, member_id))?;

        let renamed = match update.name {
            Some(name) => {
                member.name = require_text("member name", &name)?;
                true
            }
            None => false,
        };
        if let Some(role) = update.role {
            member.role = require_text("member role", &role)?;
        }
        if let Some(capacity) = update.capacity {
            member.capacity = clamp_capacity(capacity);
        }
        let member = member.clone();

        let mut storage = self.storage.lock().await;
        storage.save_team(&team).await?;
        if renamed {
            let filter = TaskFilter {
                member: Some(MemberFilter::Member(member_id)),
                ..TaskFilter::owned_by(owner.clone())
            };
            for mut task in storage.list_tasks(&filter).await? {
                task.assign_to(&member);
                storage.save_task(&task).await?;
            }
        }
        drop(storage);

        info!(team = %team_id, member = %member_id, "updated member {}", member.name);
        Ok(team)
    }

    /// Remove a member and unassign every task it held.
    pub async fn remove_member(
        &self,
        owner: &OwnerId,
        team_id: TeamId,
        member_id: MemberId,
    ) -> Result<RemovedMember> {
        let _guard = self.locks.lock(team_id).await;
        let mut team = self.owned_team(owner, team_id).await?;
        let member = team
            .remove_member(member_id)
            .ok_or_else(|| WorkError::not_found(EntityKind::Member, member_id))?;

        let mut storage = self.storage.lock().await;
        storage.save_team(&team).await?;
        let unassigned = storage.unassign_member_tasks(member_id).await?;
        drop(storage);

        info!(team = %team_id, member = %member_id, unassigned, "removed member {}", member.name);
        Ok(RemovedMember { team, member, unassigned })
    }

    /// Per-member load table of one team.
    pub async fn team_workload(&self, owner: &OwnerId, team_id: TeamId) -> Result<TeamWorkload> {
        let team = self.owned_team(owner, team_id).await?;
        let tasks = self.owner_tasks(owner).await?;
        let loads = member_loads(&team.members, &tasks);
        Ok(TeamWorkload::new(&team, &loads))
    }

    // === Projects ===

    /// Create a project staffed by one of the owner's teams.
    pub async fn create_project(
        &self,
        owner: &OwnerId,
        name: &str,
        description: &str,
        team: TeamId,
    ) -> Result<Project> {
        self.owned_team(owner, team).await?;
        let project = Project::new(require_text("project name", name)?, description, team, owner.clone());
        self.storage.lock().await.save_project(&project).await?;
        info!(project = %project.id, team = %team, "created project {}", project.name);
        Ok(project)
    }

    /// Projects of an owner.
    pub async fn list_projects(&self, owner: &OwnerId) -> Result<Vec<Project>> {
        Ok(self.storage.lock().await.list_projects(owner).await?)
    }

    /// One project.
    pub async fn project(&self, owner: &OwnerId, id: ProjectId) -> Result<Project> {
        self.owned_project(owner, id).await
    }

    /// Edit a project. Moving it to another team moves its tasks into that
    /// team's rebalancing scope; assignments are left as they are.
    pub async fn update_project(
        &self,
        owner: &OwnerId,
        id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<Project> {
        let name = update
            .name
            .as_deref()
            .map(|name| require_text("project name", name))
            .transpose()?;
        if let Some(team) = update.team {
            self.owned_team(owner, team).await?;
        }

        let (_guards, mut project) = loop {
            let current = self.owned_project(owner, id).await?;
            let target = update.team.unwrap_or(current.team);
            let guards = self.lock_team_pair(current.team, target).await;
            let project = self.owned_project(owner, id).await?;
            if project.team == current.team {
                break (guards, project);
            }
        };

        if let Some(team) = update.team {
            // The target may have been deleted while waiting
            self.owned_team(owner, team).await?;
            if team != project.team {
                info!(project = %id, from = %project.team, to = %team, "moving project");
                project.team = team;
            }
        }
        if let Some(name) = name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }

        self.storage.lock().await.save_project(&project).await?;
        info!(project = %id, "updated project {}", project.name);
        Ok(project)
    }

    /// Delete a project. Its tasks are left in place.
    pub async fn delete_project(&self, owner: &OwnerId, id: ProjectId) -> Result<()> {
        self.owned_project(owner, id).await?;
        let (_guard, _) = self.lock_project_team(id).await?;
        self.owned_project(owner, id).await?;
        self.storage.lock().await.delete_project(id).await?;
        info!(project = %id, "deleted project");
        Ok(())
    }

    // === Tasks ===

    /// Create a task, optionally assigned to a member of the project's team.
    ///
    /// Assigning to a member who is already at capacity is allowed; the
    /// returned [`MemberInfo`] flags it.
    pub async fn create_task(&self, owner: &OwnerId, spec: TaskSpec) -> Result<CreatedTask> {
        let title = require_text("task title", &spec.title)?;
        let project = self.owned_project(owner, spec.project).await?;
        let mut task = Task::new(title, spec.description, project.id, owner.clone());
        task.priority = spec.priority;
        task.status = spec.status;

        let Some(member_id) = spec.assigned_member else {
            self.storage.lock().await.save_task(&task).await?;
            info!(task = %task.id, "created task {}", task.title);
            return Ok(CreatedTask { task, member_info: None });
        };

        let (_guard, project) = self.lock_project_team(project.id).await?;
        let team = self.project_team(&project).await?;
        let member = team
            .member(member_id)
            .ok_or_else(|| WorkError::not_found(EntityKind::Member, member_id))?;

        let load = MemberLoad::from_tasks(member, &self.owner_tasks(owner).await?);
        let member_info = MemberInfo {
            name: member.name.clone(),
            current_tasks: load.current_load,
            capacity: member.capacity,
            is_over_capacity: !load.has_room(),
        };
        if member_info.is_over_capacity {
            warn!(
                member = %member.id,
                "{} already has {} of {} tasks", member.name, load.current_load, member.capacity
            );
        }

        task.assign_to(member);
        let emitter = EventEmitter::new(owner.clone());
        let mut storage = self.storage.lock().await;
        storage.save_task(&task).await?;
        emitter.emit(&mut *storage, emitter.assigned(&task)).await?;
        drop(storage);

        info!(task = %task.id, member = %member_id, "created task {}", task.title);
        Ok(CreatedTask {
            task,
            member_info: Some(member_info),
        })
    }

    /// Tasks of an owner matching `filter`. The filter's owner is replaced
    /// with `owner`.
    pub async fn list_tasks(&self, owner: &OwnerId, mut filter: TaskFilter) -> Result<Vec<Task>> {
        filter.owner = Some(owner.clone());
        Ok(self.storage.lock().await.list_tasks(&filter).await?)
    }

    /// One task.
    pub async fn task(&self, owner: &OwnerId, id: TaskId) -> Result<Task> {
        self.owned_task(owner, id).await
    }

    /// Edit a task. A change of assignee records `Reassigned` or
    /// `Unassigned`; setting the current assignee again records nothing.
    ///
    /// Runs under the team guard even for plain field edits, since the whole
    /// task is written back.
    pub async fn update_task(&self, owner: &OwnerId, id: TaskId, update: TaskUpdate) -> Result<Task> {
        let current = self.owned_task(owner, id).await?;
        let locked = self.lock_task_team(current.project).await?;
        let team = match (update.assigned_member, &locked) {
            (None, _) => None,
            (Some(_), Some((_, project))) => Some(self.project_team(project).await?),
            (Some(_), None) => {
                return Err(WorkError::not_found(EntityKind::Project, current.project));
            }
        };

        // Re-read under the guard
        let mut task = self.owned_task(owner, id).await?;
        let previous = task.assigned_member_name.clone();

        if let Some(title) = update.title {
            task.title = require_text("task title", &title)?;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        task.updated_at = chrono::Utc::now();

        let emitter = EventEmitter::new(owner.clone());
        let event: Option<AssignmentEvent> = match (update.assigned_member, &team) {
            (Some(Some(member_id)), Some(team)) if task.assigned_member != Some(member_id) => {
                let member = team
                    .member(member_id)
                    .ok_or_else(|| WorkError::not_found(EntityKind::Member, member_id))?;
                task.assign_to(member);
                Some(emitter.reassigned(&task, &previous))
            }
            (Some(None), Some(_)) if task.assigned_member.is_some() => {
                task.unassign();
                Some(emitter.unassigned(&task, &previous))
            }
            _ => None,
        };

        let mut storage = self.storage.lock().await;
        storage.save_task(&task).await?;
        if let Some(event) = event {
            emitter.emit(&mut *storage, event).await?;
        }
        drop(storage);

        info!(task = %task.id, assignee = %task.assigned_member_name, "updated task {}", task.title);
        Ok(task)
    }

    /// Assign a task to `member`, or unassign it with `None`.
    pub async fn assign_task(
        &self,
        owner: &OwnerId,
        id: TaskId,
        member: Option<MemberId>,
    ) -> Result<Task> {
        let update = TaskUpdate {
            assigned_member: Some(member),
            ..Default::default()
        };
        self.update_task(owner, id, update).await
    }

    /// Delete a task.
    pub async fn delete_task(&self, owner: &OwnerId, id: TaskId) -> Result<()> {
        let task = self.owned_task(owner, id).await?;
        let _locked = self.lock_task_team(task.project).await?;
        self.owned_task(owner, id).await?;
        self.storage.lock().await.delete_task(id).await?;
        info!(task = %id, "deleted task");
        Ok(())
    }

    /// Give a task to the member of its project's team with the most spare
    /// capacity.
    pub async fn auto_assign(&self, owner: &OwnerId, id: TaskId) -> Result<AutoAssignment> {
        let task = self.owned_task(owner, id).await?;
        let (_guard, project) = self.lock_project_team(task.project).await?;
        let team = self.project_team(&project).await?;
        if team.members.is_empty() {
            return Err(WorkError::NoCandidates { team: team.id });
        }

        // Fresh reads under the guard
        let task = self.owned_task(owner, id).await?;
        let loads = member_loads(&team.members, &self.owner_tasks(owner).await?);
        let mut chosen = select_target(&loads)
            .map_err(|_| WorkError::NoCandidates { team: team.id })?
            .clone();
        let member = team
            .member(chosen.member)
            .ok_or_else(|| WorkError::not_found(EntityKind::Member, chosen.member))?;
        debug!(
            task = %task.id,
            member = %member.id,
            available = chosen.available_capacity(),
            "auto-assign picked {}", member.name
        );

        let already_counted = task.is_open_for(member.id);
        let previous = task.assigned_member_name.clone();
        let emitter = EventEmitter::new(owner.clone());
        let mut storage = self.storage.lock().await;
        let task = storage.assign_task(task.id, Some(member)).await?;
        emitter
            .emit(&mut *storage, emitter.auto_assigned(&task, &previous))
            .await?;
        drop(storage);

        if !already_counted && task.is_open() {
            chosen.take_task();
        }
        info!(task = %task.id, "task auto-assigned to {}", chosen.name);
        Ok(AutoAssignment { task, member: chosen })
    }

    // === Rebalancing and reporting ===

    /// Rebalance every team of an owner, one team at a time.
    pub async fn rebalance(&self, owner: &OwnerId) -> Result<RebalanceReport> {
        let emitter = EventEmitter::new(owner.clone());
        let team_ids: Vec<TeamId> = self
            .storage
            .lock()
            .await
            .list_teams(owner)
            .await?
            .iter()
            .map(|t| t.id)
            .collect();

        let mut report = RebalanceReport::default();
        for team_id in team_ids {
            let _guard = self.locks.lock(team_id).await;

            let (team, projects) = {
                let storage = self.storage.lock().await;
                let Some(team) = storage.load_team(team_id).await? else {
                    continue;
                };
                let projects: Vec<Project> = storage
                    .list_team_projects(team_id)
                    .await?
                    .into_iter()
                    .filter(|p| &p.owner == owner)
                    .collect();
                (team, projects)
            };
            if projects.is_empty() {
                debug!(team = %team_id, "no projects, skipping");
                continue;
            }

            let filter = TaskFilter {
                projects: Some(projects.iter().map(|p| p.id).collect()),
                ..TaskFilter::owned_by(owner.clone())
            };
            let tasks = self.storage.lock().await.list_tasks(&filter).await?;
            let snapshot = TeamSnapshot::new(team, &projects, tasks);
            let outcome = self.rebalancer.rebalance(&snapshot);

            let mut storage = self.storage.lock().await;
            for entry in &outcome.moves {
                let member = snapshot
                    .team
                    .member(entry.to.id)
                    .ok_or_else(|| WorkError::not_found(EntityKind::Member, entry.to.id))?;
                storage.assign_task(entry.task, Some(member)).await?;
                emitter.emit(&mut *storage, emitter.auto_reassigned(entry)).await?;
            }
            drop(storage);

            info!(
                team = %team_id,
                moved = outcome.moves.len(),
                unresolved = outcome.unresolved.len(),
                "rebalanced team {}", outcome.team_name
            );
            report.outcomes.push(outcome);
        }

        info!("{}", report.message());
        Ok(report)
    }

    /// Owner-wide totals, workloads and recent activity.
    pub async fn dashboard(&self, owner: &OwnerId) -> Result<Dashboard> {
        let storage = self.storage.lock().await;
        let total_projects = storage.list_projects(owner).await?.len();
        let tasks = storage.list_tasks(&TaskFilter::owned_by(owner.clone())).await?;
        let teams = storage.list_teams(owner).await?;
        let recent_activity = storage
            .list_activity(owner, self.config.recent_activity_limit)
            .await?;
        drop(storage);

        let tasks_by_status = TaskStatus::ALL
            .iter()
            .map(|status| (*status, tasks.iter().filter(|t| t.status == *status).count()))
            .collect();
        let teams = teams
            .iter()
            .map(|team| TeamWorkload::new(team, &member_loads(&team.members, &tasks)))
            .collect();

        Ok(Dashboard {
            total_projects,
            total_tasks: tasks.len(),
            tasks_by_status,
            teams,
            recent_activity,
        })
    }

    /// Newest activity first, `limit` defaulting to the configured page size.
    pub async fn activity(&self, owner: &OwnerId, limit: Option<usize>) -> Result<Vec<AssignmentEvent>> {
        let limit = limit.unwrap_or(self.config.default_activity_limit);
        Ok(self.storage.lock().await.list_activity(owner, limit).await?)
    }
}
