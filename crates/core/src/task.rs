//! Task model - the unit of work assigned to members.

use serde::{Deserialize, Serialize};
use crate::id::{MemberId, OwnerId, ProjectId, TaskId};
use crate::team::Member;
use crate::Time;

/// Label used wherever a task has no assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// A task is a unit of work belonging to one project, optionally assigned to
/// one member of the project's team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Owning project
    pub project: ProjectId,

    /// Assignee, `None` when unassigned
    pub assigned_member: Option<MemberId>,

    /// Assignee display name, [`UNASSIGNED`] when unassigned
    pub assigned_member_name: String,

    /// Priority
    pub priority: Priority,

    /// Current status
    pub status: TaskStatus,

    /// Who owns the task
    pub owner: OwnerId,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl Task {
    /// Create an unassigned, pending, medium-priority task.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        project: ProjectId,
        owner: OwnerId,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: description.into(),
            project,
            assigned_member: None,
            assigned_member_name: UNASSIGNED.to_string(),
            priority: Priority::default(),
            status: TaskStatus::default(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the task still counts toward its assignee's load.
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether this task is open and assigned to `member`.
    pub fn is_open_for(&self, member: MemberId) -> bool {
        self.assigned_member == Some(member) && self.is_open()
    }

    /// Point the task at `member`, keeping the name label in sync.
    pub fn assign_to(&mut self, member: &Member) {
        self.assigned_member = Some(member.id);
        self.assigned_member_name = member.name.clone();
        self.updated_at = chrono::Utc::now();
    }

    /// Clear the assignee.
    pub fn unassign(&mut self) {
        self.assigned_member = None;
        self.assigned_member_name = UNASSIGNED.to_string();
        self.updated_at = chrono::Utc::now();
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Moved first when a member is overloaded
    Low,
    /// Moved after all Low tasks
    #[default]
    Medium,
    /// Never moved automatically
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Position in the eviction order, `None` for tasks that are pinned.
    pub fn eviction_rank(self) -> Option<u8> {
        match self {
            Priority::Low => Some(0),
            Priority::Medium => Some(1),
            Priority::High => None,
        }
    }

    /// Display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseError::Priority(s.to_string())),
        }
    }
}

/// Task status. `Done` is the only terminal value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Completed
    Done,
}

impl TaskStatus {
    /// All statuses, in workflow order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];

    /// Terminal tasks are excluded from load counts.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Display name.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ParseError::Status(s.to_string())),
        }
    }
}

/// Error parsing a priority or status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unknown priority
    #[error("unknown priority `{0}` (expected Low, Medium or High)")]
    Priority(String),

    /// Unknown status
    #[error("unknown status `{0}` (expected Pending, In Progress or Done)")]
    Status(String),
}

/// Assignee filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberFilter {
    /// Only tasks with no assignee
    Unassigned,
    /// Only tasks assigned to this member
    Member(MemberId),
}

/// Filter for querying tasks. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Filter by owner
    pub owner: Option<OwnerId>,

    /// Filter by project (any of)
    pub projects: Option<Vec<ProjectId>>,

    /// Filter by assignee
    pub member: Option<MemberFilter>,

    /// Filter by status
    pub status: Option<TaskStatus>,

    /// Filter by priority
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Everything owned by `owner`.
    pub fn owned_by(owner: OwnerId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    /// Check whether a task passes the filter.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(owner) = &self.owner {
            if &task.owner != owner {
                return false;
            }
        }
        if let Some(projects) = &self.projects {
            if !projects.contains(&task.project) {
                return false;
            }
        }
        match self.member {
            Some(MemberFilter::Unassigned) if task.assigned_member.is_some() => return false,
            Some(MemberFilter::Member(id)) if task.assigned_member != Some(id) => return false,
            _ => {}
        }
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Capacity;

    fn task() -> Task {
        Task::new("Write docs", "", ProjectId::new(), OwnerId::local())
    }

    #[test]
    fn test_new_task_defaults() {
        let task = task();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assigned_member_name, UNASSIGNED);
        assert!(task.is_open());
    }

    #[test]
    fn test_assign_and_unassign() {
        let member = Member::new("Alice", "Backend", Capacity::default());
        let mut task = task();

        task.assign_to(&member);
        assert!(task.is_open_for(member.id));
        assert_eq!(task.assigned_member_name, "Alice");

        task.status = TaskStatus::Done;
        assert!(!task.is_open_for(member.id));

        task.unassign();
        assert_eq!(task.assigned_member, None);
        assert_eq!(task.assigned_member_name, UNASSIGNED);
    }

    #[test]
    fn test_eviction_rank() {
        assert!(Priority::Low.eviction_rank() < Priority::Medium.eviction_rank());
        assert_eq!(Priority::High.eviction_rank(), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!(matches!("urgent".parse::<Priority>(), Err(ParseError::Priority(_))));
        assert!(matches!("closed".parse::<TaskStatus>(), Err(ParseError::Status(_))));
    }

    #[test]
    fn test_filter_matches() {
        let member = Member::new("Bob", "QA", Capacity::default());
        let mut assigned = task();
        assigned.assign_to(&member);
        assigned.priority = Priority::High;
        let unassigned = task();

        let by_member = TaskFilter {
            member: Some(MemberFilter::Member(member.id)),
            ..Default::default()
        };
        assert!(by_member.matches(&assigned));
        assert!(!by_member.matches(&unassigned));

        let only_unassigned = TaskFilter {
            member: Some(MemberFilter::Unassigned),
            ..Default::default()
        };
        assert!(only_unassigned.matches(&unassigned));

        let high = TaskFilter {
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert!(high.matches(&assigned));
        assert!(!high.matches(&unassigned));

        let other_owner = TaskFilter::owned_by(OwnerId::new("someone-else"));
        assert!(!other_owner.matches(&assigned));

        let by_project = TaskFilter {
            projects: Some(vec![assigned.project]),
            ..Default::default()
        };
        assert!(by_project.matches(&assigned));
        assert!(!by_project.matches(&unassigned));
    }
}
