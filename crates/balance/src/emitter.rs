//! Event emitter - turns assignment decisions into audit records.

use crewload_core::{AssignmentAction, AssignmentEvent, OwnerId, Task, UNASSIGNED};
use crewload_storage::{ActivitySink, StorageError};
use tracing::debug;
use crate::rebalancer::Reassignment;

/// Builds audit records for one owner and hands them to a sink.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    owner: OwnerId,
}

impl EventEmitter {
    /// Create an emitter acting for `owner`.
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    /// The owner stamped on every record.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    fn record(&self, action: AssignmentAction, task: &Task, from: &str, to: &str) -> AssignmentEvent {
        AssignmentEvent::new(action, task.title.clone(), from, to, task.project, self.owner.clone())
    }

    /// A freshly created task was given to its assignee.
    pub fn assigned(&self, task: &Task) -> AssignmentEvent {
        self.record(AssignmentAction::Assigned, task, UNASSIGNED, &task.assigned_member_name)
    }

    /// A task was moved by hand; `previous` is the old assignee label.
    pub fn reassigned(&self, task: &Task, previous: &str) -> AssignmentEvent {
        self.record(AssignmentAction::Reassigned, task, previous, &task.assigned_member_name)
    }

    /// A task lost its assignee.
    pub fn unassigned(&self, task: &Task, previous: &str) -> AssignmentEvent {
        self.record(AssignmentAction::Unassigned, task, previous, UNASSIGNED)
    }

    /// A task was auto-assigned.
    pub fn auto_assigned(&self, task: &Task, previous: &str) -> AssignmentEvent {
        self.record(AssignmentAction::AutoAssigned, task, previous, &task.assigned_member_name)
    }

    /// A rebalancing move.
    pub fn auto_reassigned(&self, entry: &Reassignment) -> AssignmentEvent {
        AssignmentEvent::new(
            AssignmentAction::AutoReassigned,
            entry.task_title.clone(),
            entry.from.name.clone(),
            entry.to.name.clone(),
            entry.project,
            self.owner.clone(),
        )
    }

    /// Append `event` to `sink` right away and return it.
    pub async fn emit<S>(&self, sink: &mut S, event: AssignmentEvent) -> Result<AssignmentEvent, StorageError>
    where
        S: ActivitySink + ?Sized,
    {
        sink.append_activity(&event).await?;
        debug!(
            action = %event.action,
            from = %event.from_member,
            to = %event.to_member,
            "recorded activity for {}", event.task_title
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebalancer::MemberRef;
    use crewload_core::{Capacity, Member, MemberId, ProjectId, TaskId};
    use crewload_storage::MemoryStorage;

    fn assigned_task() -> Task {
        let mut task = Task::new("Fix login", "", ProjectId::new(), OwnerId::local());
        task.assign_to(&Member::new("Alice", "Backend", Capacity::default()));
        task
    }

    #[test]
    fn test_labels_and_members() {
        let emitter = EventEmitter::new(OwnerId::local());
        let task = assigned_task();

        let assigned = emitter.assigned(&task);
        assert_eq!(assigned.action.label(), "Task Assigned");
        assert_eq!((assigned.from_member.as_str(), assigned.to_member.as_str()), (UNASSIGNED, "Alice"));

        let reassigned = emitter.reassigned(&task, "Bob");
        assert_eq!((reassigned.from_member.as_str(), reassigned.to_member.as_str()), ("Bob", "Alice"));

        let unassigned = emitter.unassigned(&task, "Alice");
        assert_eq!(unassigned.to_member, UNASSIGNED);
        assert_eq!(unassigned.project, task.project);

        let auto = emitter.auto_assigned(&task, UNASSIGNED);
        assert_eq!(auto.action, AssignmentAction::AutoAssigned);
    }

    #[test]
    fn test_auto_reassigned_from_plan() {
        let emitter = EventEmitter::new(OwnerId::new("owner-1"));
        let entry = Reassignment {
            task: TaskId::new(),
            task_title: "Docs".to_string(),
            project: ProjectId::new(),
            from: MemberRef { id: MemberId::new(), name: "Busy".to_string() },
            to: MemberRef { id: MemberId::new(), name: "Free".to_string() },
        };
        let event = emitter.auto_reassigned(&entry);
        assert_eq!(event.action.label(), "Task Auto-Reassigned");
        assert_eq!(event.from_member, "Busy");
        assert_eq!(event.to_member, "Free");
        assert_eq!(event.owner, OwnerId::new("owner-1"));
    }

    #[tokio::test]
    async fn test_emit_appends_in_order() {
        let emitter = EventEmitter::new(OwnerId::local());
        let mut sink = MemoryStorage::new();
        let task = assigned_task();

        emitter.emit(&mut sink, emitter.assigned(&task)).await.unwrap();
        emitter.emit(&mut sink, emitter.unassigned(&task, "Alice")).await.unwrap();

        let actions: Vec<_> = sink.activity().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AssignmentAction::Assigned, AssignmentAction::Unassigned]);
    }
}
