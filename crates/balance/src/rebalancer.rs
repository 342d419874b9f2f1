//! Rebalancing - move Low and Medium tasks off overloaded members.
//!
//! One pass over a team snapshot:
//! ```text
//! loads → overloaded members → evict Low, then Medium → first member with room
//! ```
//! High-priority tasks are never moved. An overload that cannot be fixed is
//! reported, not treated as a failure.

use crewload_core::{MemberId, Project, ProjectId, Task, TaskId, Team, TeamId};
use serde::Serialize;
use tracing::{debug, warn};
use crate::capacity::{member_loads, MemberLoad};
use crate::selector::{FirstAvailable, MemberSelector};

/// The state one rebalancing pass works over.
#[derive(Debug, Clone)]
pub struct TeamSnapshot {
    /// The team and its roster
    pub team: Team,
    /// Tasks of the team's projects, in storage order
    pub tasks: Vec<Task>,
}

impl TeamSnapshot {
    /// Build a snapshot, keeping only the tasks that belong to `projects`.
    pub fn new(team: Team, projects: &[Project], tasks: Vec<Task>) -> Self {
        let in_scope: Vec<ProjectId> = projects
            .iter()
            .filter(|p| p.team == team.id)
            .map(|p| p.id)
            .collect();
        let tasks = tasks
            .into_iter()
            .filter(|t| in_scope.contains(&t.project))
            .collect();
        Self { team, tasks }
    }

    /// Open tasks held by team members.
    pub fn open_task_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| {
                t.is_open()
                    && t.assigned_member
                        .is_some_and(|id| self.team.member(id).is_some())
            })
            .count()
    }
}

/// A member as it appears in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRef {
    /// Member id
    pub id: MemberId,
    /// Member name
    pub name: String,
}

impl From<&MemberLoad> for MemberRef {
    fn from(load: &MemberLoad) -> Self {
        Self {
            id: load.member,
            name: load.name.clone(),
        }
    }
}

/// One planned move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    /// Task being moved
    pub task: TaskId,
    /// Task title
    pub task_title: String,
    /// Project of the task
    pub project: ProjectId,
    /// Overloaded member giving the task up
    pub from: MemberRef,
    /// Member receiving the task
    pub to: MemberRef,
}

/// Why an overloaded member stayed overloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnresolvedReason {
    /// Nobody else on the team had room
    NoAvailableMember,
    /// Only High-priority tasks were left to move
    PinnedHighPriority,
}

impl UnresolvedReason {
    /// Short explanation for reports.
    pub fn describe(self) -> &'static str {
        match self {
            Self::NoAvailableMember => "no available member",
            Self::PinnedHighPriority => "remaining tasks are High priority",
        }
    }
}

/// A member the pass could only partly relieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialRebalance {
    /// The member
    pub member: MemberId,
    /// Member name
    pub member_name: String,
    /// Tasks over capacity before the pass
    pub excess: usize,
    /// Tasks actually moved away
    pub moved: usize,
    /// Why the rest stayed
    pub reason: UnresolvedReason,
}

/// Result of rebalancing one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebalanceOutcome {
    /// Team that was rebalanced
    pub team: TeamId,
    /// Team name
    pub team_name: String,
    /// Moves in decision order
    pub moves: Vec<Reassignment>,
    /// Members still overloaded afterwards
    pub unresolved: Vec<PartialRebalance>,
}

impl RebalanceOutcome {
    /// Nothing moved and nothing left over.
    pub fn is_balanced(&self) -> bool {
        self.moves.is_empty() && self.unresolved.is_empty()
    }
}

/// Plans task moves away from overloaded members.
///
/// Destinations are always chosen with [`FirstAvailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Rebalancer {
    destination: FirstAvailable,
}

impl Rebalancer {
    /// Create a rebalancer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the moves for one team. Pure: the snapshot is not modified.
    pub fn rebalance(&self, snapshot: &TeamSnapshot) -> RebalanceOutcome {
        let team = &snapshot.team;
        let mut loads = member_loads(&team.members, &snapshot.tasks);
        let overloaded: Vec<usize> = loads
            .iter()
            .enumerate()
            .filter(|(_, load)| load.is_overloaded())
            .map(|(index, _)| index)
            .collect();

        let mut moves = Vec::new();
        let mut unresolved = Vec::new();

        for source in overloaded {
            let source_id = loads[source].member;
            let excess = loads[source].excess();

            let mut candidates: Vec<&Task> = snapshot
                .tasks
                .iter()
                .filter(|t| t.is_open_for(source_id) && t.priority.eviction_rank().is_some())
                .collect();
            // Stable: original order survives inside each priority group
            candidates.sort_by_key(|t| t.priority.eviction_rank());

            let mut moved = 0;
            let mut blocked = false;
            for task in candidates.into_iter().take(excess) {
                let Some(target) = self.destination.select(&loads, Some(source_id)) else {
                    blocked = true;
                    break;
                };

                loads[source].release_task();
                loads[target].take_task();
                moved += 1;

                debug!(
                    task = %task.id,
                    from = %loads[source].name,
                    to = %loads[target].name,
                    "planned move of {} task", task.priority
                );

                moves.push(Reassignment {
                    task: task.id,
                    task_title: task.title.clone(),
                    project: task.project,
                    from: MemberRef::from(&loads[source]),
                    to: MemberRef::from(&loads[target]),
                });
            }

            if loads[source].is_overloaded() {
                let reason = if blocked {
                    UnresolvedReason::NoAvailableMember
                } else {
                    UnresolvedReason::PinnedHighPriority
                };
                warn!(
                    team = %team.id,
                    member = %loads[source].name,
                    "moved {} of {} excess tasks: {}", moved, excess, reason.describe()
                );
                unresolved.push(PartialRebalance {
                    member: source_id,
                    member_name: loads[source].name.clone(),
                    excess,
                    moved,
                    reason,
                });
            }
        }

        RebalanceOutcome {
            team: team.id,
            team_name: team.name.clone(),
            moves,
            unresolved,
        }
    }
}

/// Apply planned moves to a snapshot in place. Used to check a plan or to
/// chain passes without going back to storage.
pub fn apply_moves(snapshot: &mut TeamSnapshot, moves: &[Reassignment]) {
    for entry in moves {
        let Some(member) = snapshot.team.member(entry.to.id).cloned() else {
            continue;
        };
        if let Some(task) = snapshot.tasks.iter_mut().find(|t| t.id == entry.task) {
            task.assign_to(&member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewload_core::{Capacity, Member, OwnerId, Priority, TaskStatus};

    struct Fixture {
        team: Team,
        project: Project,
        tasks: Vec<Task>,
    }

    impl Fixture {
        fn new(capacities: &[(&str, i64)]) -> Self {
            let owner = OwnerId::local();
            let mut team = Team::new("Core", owner.clone());
            for (name, capacity) in capacities {
                team.add_member(Member::new(*name, "Dev", Capacity::clamped(*capacity)));
            }
            let project = Project::new("API", "", team.id, owner);
            Self {
                team,
                project,
                tasks: Vec::new(),
            }
        }

        fn give(&mut self, member: usize, title: &str, priority: Priority) -> TaskId {
            let mut task = Task::new(title, "", self.project.id, OwnerId::local());
            task.priority = priority;
            task.assign_to(&self.team.members[member]);
            let id = task.id;
            self.tasks.push(task);
            id
        }

        fn snapshot(&self) -> TeamSnapshot {
            TeamSnapshot::new(self.team.clone(), &[self.project.clone()], self.tasks.clone())
        }
    }

    #[test]
    fn test_moves_low_before_medium() {
        let mut fx = Fixture::new(&[("M1", 2), ("M2", 2)]);
        fx.give(0, "high", Priority::High);
        fx.give(0, "medium", Priority::Medium);
        let low = fx.give(0, "low", Priority::Low);

        let outcome = Rebalancer::new().rebalance(&fx.snapshot());
        assert_eq!(outcome.moves.len(), 1);
        let entry = &outcome.moves[0];
        assert_eq!(entry.task, low);
        assert_eq!(entry.from.name, "M1");
        assert_eq!(entry.to.name, "M2");
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_single_member_has_nowhere_to_go() {
        let mut fx = Fixture::new(&[("Solo", 1)]);
        fx.give(0, "a", Priority::Medium);
        fx.give(0, "b", Priority::Medium);

        let outcome = Rebalancer::new().rebalance(&fx.snapshot());
        assert!(outcome.moves.is_empty());
        assert_eq!(
            outcome.unresolved,
            vec![PartialRebalance {
                member: fx.team.members[0].id,
                member_name: "Solo".to_string(),
                excess: 1,
                moved: 0,
                reason: UnresolvedReason::NoAvailableMember,
            }]
        );
    }

    #[test]
    fn test_high_priority_never_moves() {
        let mut fx = Fixture::new(&[("Busy", 1), ("Free", 5)]);
        fx.give(0, "h1", Priority::High);
        fx.give(0, "h2", Priority::High);
        fx.give(0, "h3", Priority::High);

        let outcome = Rebalancer::new().rebalance(&fx.snapshot());
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].reason, UnresolvedReason::PinnedHighPriority);
        assert_eq!(outcome.unresolved[0].excess, 2);
    }

    #[test]
    fn test_never_moves_more_than_excess() {
        let mut fx = Fixture::new(&[("Busy", 2), ("Free", 5)]);
        for i in 0..5 {
            fx.give(0, &format!("low-{i}"), Priority::Low);
        }

        let outcome = Rebalancer::new().rebalance(&fx.snapshot());
        assert_eq!(outcome.moves.len(), 3);
        assert!(outcome.moves.iter().all(|m| m.from.name == "Busy"));
        // Stable order inside the Low group
        let titles: Vec<_> = outcome.moves.iter().map(|m| m.task_title.as_str()).collect();
        assert_eq!(titles, vec!["low-0", "low-1", "low-2"]);
    }

    #[test]
    fn test_first_available_destination_fills_up() {
        let mut fx = Fixture::new(&[("Busy", 0), ("Small", 1), ("Big", 5)]);
        fx.give(0, "a", Priority::Low);
        fx.give(0, "b", Priority::Low);
        fx.give(0, "c", Priority::Medium);

        let outcome = Rebalancer::new().rebalance(&fx.snapshot());
        let targets: Vec<_> = outcome.moves.iter().map(|m| m.to.name.as_str()).collect();
        // Small takes one, then Big takes the rest
        assert_eq!(targets, vec!["Small", "Big", "Big"]);
    }

    #[test]
    fn test_partial_when_destinations_run_out() {
        let mut fx = Fixture::new(&[("Busy", 1), ("Small", 1)]);
        for i in 0..4 {
            fx.give(0, &format!("t{i}"), Priority::Medium);
        }

        let outcome = Rebalancer::new().rebalance(&fx.snapshot());
        assert_eq!(outcome.moves.len(), 1);
        let partial = &outcome.unresolved[0];
        assert_eq!((partial.excess, partial.moved), (3, 1));
        assert_eq!(partial.reason, UnresolvedReason::NoAvailableMember);
    }

    #[test]
    fn test_done_and_foreign_tasks_ignored() {
        let mut fx = Fixture::new(&[("M1", 1), ("M2", 2)]);
        fx.give(0, "open", Priority::Low);
        let done = fx.give(0, "done", Priority::Low);
        fx.tasks.iter_mut().find(|t| t.id == done).unwrap().status = TaskStatus::Done;

        // A task of some other project is out of scope
        let mut foreign = Task::new("foreign", "", ProjectId::new(), OwnerId::local());
        foreign.assign_to(&fx.team.members[0]);
        fx.tasks.push(foreign);

        let snapshot = fx.snapshot();
        assert_eq!(snapshot.tasks.len(), 2);
        assert!(Rebalancer::new().rebalance(&snapshot).is_balanced());
    }

    #[test]
    fn test_conservation_and_idempotence() {
        let mut fx = Fixture::new(&[("A", 1), ("B", 2), ("C", 1), ("D", 3)]);
        fx.give(0, "a1", Priority::Medium);
        fx.give(0, "a2", Priority::Low);
        fx.give(0, "a3", Priority::High);
        fx.give(2, "c1", Priority::Low);
        fx.give(2, "c2", Priority::High);
        fx.give(2, "c3", Priority::Medium);
        fx.give(1, "b1", Priority::Medium);

        let mut snapshot = fx.snapshot();
        let before = snapshot.open_task_count();

        let first = Rebalancer::new().rebalance(&snapshot);
        assert_eq!(first.moves.len(), 4);
        apply_moves(&mut snapshot, &first.moves);
        assert_eq!(snapshot.open_task_count(), before);

        let loads = member_loads(&snapshot.team.members, &snapshot.tasks);
        assert!(loads.iter().all(|l| !l.is_overloaded()));

        let second = Rebalancer::new().rebalance(&snapshot);
        assert!(second.moves.is_empty());
        let third = Rebalancer::new().rebalance(&snapshot);
        assert_eq!(second, third);
    }

    #[test]
    fn test_idempotent_when_stuck() {
        let mut fx = Fixture::new(&[("Solo", 1)]);
        fx.give(0, "a", Priority::Low);
        fx.give(0, "b", Priority::Low);
        let snapshot = fx.snapshot();

        let first = Rebalancer::new().rebalance(&snapshot);
        let second = Rebalancer::new().rebalance(&snapshot);
        assert!(first.moves.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_deterministic() {
        let mut fx = Fixture::new(&[("A", 1), ("B", 1), ("C", 1)]);
        for i in 0..3 {
            fx.give(0, &format!("t{i}"), Priority::Low);
        }
        let snapshot = fx.snapshot();
        let expected = Rebalancer::new().rebalance(&snapshot);
        for _ in 0..5 {
            assert_eq!(Rebalancer::new().rebalance(&snapshot), expected);
        }
    }
}
