//! Assignment events - the audit trail of who got which task.

use crate::id::{EventId, OwnerId, ProjectId};
use crate::Time;
use serde::{Deserialize, Serialize};

/// What kind of assignment change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentAction {
    /// A task was created with an assignee
    Assigned,
    /// A task was moved to a member by hand
    Reassigned,
    /// A task lost its assignee
    Unassigned,
    /// A task was placed on the least loaded member
    AutoAssigned,
    /// A task was moved off an overloaded member
    AutoReassigned,
}

impl AssignmentAction {
    /// Human readable label stored with the record.
    pub fn label(self) -> &'static str {
        match self {
            Self::Assigned => "Task Assigned",
            Self::Reassigned => "Task Reassigned",
            Self::Unassigned => "Task Unassigned",
            Self::AutoAssigned => "Task Auto-Assigned",
            Self::AutoReassigned => "Task Auto-Reassigned",
        }
    }
}

impl std::fmt::Display for AssignmentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable record of one assignment change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    /// Unique identifier
    pub id: EventId,

    /// What happened
    pub action: AssignmentAction,

    /// Title of the task at the time of the change
    pub task_title: String,

    /// Previous assignee name, or `Unassigned`
    pub from_member: String,

    /// New assignee name, or `Unassigned`
    pub to_member: String,

    /// Project the task belongs to
    pub project: ProjectId,

    /// Who the change was made for
    pub owner: OwnerId,

    /// When it happened
    pub timestamp: Time,
}

impl AssignmentEvent {
    /// Create a new event stamped with the current time.
    pub fn new(
        action: AssignmentAction,
        task_title: impl Into<String>,
        from_member: impl Into<String>,
        to_member: impl Into<String>,
        project: ProjectId,
        owner: OwnerId,
    ) -> Self {
        Self {
            id: EventId::new(),
            action,
            task_title: task_title.into(),
            from_member: from_member.into(),
            to_member: to_member.into(),
            project,
            owner,
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        assert_eq!(AssignmentAction::Assigned.label(), "Task Assigned");
        assert_eq!(AssignmentAction::AutoReassigned.to_string(), "Task Auto-Reassigned");
    }

    #[test]
    fn test_event_serializes() {
        let event = AssignmentEvent::new(
            AssignmentAction::Unassigned,
            "Fix login",
            "Alice",
            crate::UNASSIGNED,
            ProjectId::new(),
            OwnerId::local(),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: AssignmentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
