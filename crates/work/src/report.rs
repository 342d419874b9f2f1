//! Results returned by manager operations.

use crewload_balance::{MemberLoad, RebalanceOutcome, Reassignment};
use crewload_core::{AssignmentEvent, Capacity, Member, MemberId, Task, TaskStatus, Team, TeamId};
use serde::Serialize;

/// One row of a team's workload table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWorkload {
    /// Member id
    pub id: MemberId,
    /// Member name
    pub name: String,
    /// Member role
    pub role: String,
    /// Member capacity
    pub capacity: Capacity,
    /// Open tasks assigned
    pub current_tasks: usize,
    /// Whether `current_tasks > capacity`
    pub is_overloaded: bool,
}

/// Workload of every member of one team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamWorkload {
    /// Team id
    pub team: TeamId,
    /// Team name
    pub name: String,
    /// One row per member, in roster order
    pub members: Vec<MemberWorkload>,
}

impl TeamWorkload {
    /// Combine a roster with its computed loads.
    pub fn new(team: &Team, loads: &[MemberLoad]) -> Self {
        let members = team
            .members
            .iter()
            .zip(loads)
            .map(|(member, load)| MemberWorkload {
                id: member.id,
                name: member.name.clone(),
                role: member.role.clone(),
                capacity: member.capacity,
                current_tasks: load.current_load,
                is_overloaded: load.is_overloaded(),
            })
            .collect();
        Self {
            team: team.id,
            name: team.name.clone(),
            members,
        }
    }

    /// Members over capacity.
    pub fn overloaded(&self) -> impl Iterator<Item = &MemberWorkload> {
        self.members.iter().filter(|m| m.is_overloaded)
    }
}

/// Result of removing a member from a team.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedMember {
    /// The team after removal
    pub team: Team,
    /// The removed member
    pub member: Member,
    /// Tasks that lost their assignee
    pub unassigned: usize,
}

/// Load of the chosen member when a task is created with an assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    /// Member name
    pub name: String,
    /// Open tasks before this one
    pub current_tasks: usize,
    /// Member capacity
    pub capacity: Capacity,
    /// Already at or above capacity before this task
    pub is_over_capacity: bool,
}

/// Result of creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTask {
    /// The stored task
    pub task: Task,
    /// Assignee load, when an assignee was given
    pub member_info: Option<MemberInfo>,
}

/// Result of auto-assigning a task.
#[derive(Debug, Clone, Serialize)]
pub struct AutoAssignment {
    /// The task after assignment
    pub task: Task,
    /// The chosen member, load including this task
    pub member: MemberLoad,
}

/// Result of rebalancing every team of an owner.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RebalanceReport {
    /// One outcome per team that has projects, in team order
    pub outcomes: Vec<RebalanceOutcome>,
}

impl RebalanceReport {
    /// Every move across all teams, in decision order.
    pub fn moves(&self) -> impl Iterator<Item = &Reassignment> {
        self.outcomes.iter().flat_map(|o| o.moves.iter())
    }

    /// Total number of moves.
    pub fn move_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.moves.len()).sum()
    }

    /// Summary line.
    pub fn message(&self) -> String {
        match self.move_count() {
            0 => "No tasks needed reassignment".to_string(),
            n => format!("{} task(s) reassigned successfully", n),
        }
    }
}

/// Owner-wide overview.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Number of projects
    pub total_projects: usize,
    /// Number of tasks, any status
    pub total_tasks: usize,
    /// Task count per status, every status listed
    pub tasks_by_status: Vec<(TaskStatus, usize)>,
    /// Workload of every team
    pub teams: Vec<TeamWorkload>,
    /// Newest activity first
    pub recent_activity: Vec<AssignmentEvent>,
}
