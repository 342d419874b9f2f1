//! Capacity model - how loaded each member is.

use crewload_core::{Capacity, Member, MemberId, Task};
use serde::Serialize;

/// A member annotated with its current open-task count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLoad {
    /// The member
    pub member: MemberId,
    /// Member name, carried for events and reports
    pub name: String,
    /// Member capacity
    pub capacity: Capacity,
    /// Open tasks currently assigned
    pub current_load: usize,
}

impl MemberLoad {
    /// Annotate `member` with an already known load.
    pub fn new(member: &Member, current_load: usize) -> Self {
        Self {
            member: member.id,
            name: member.name.clone(),
            capacity: member.capacity,
            current_load,
        }
    }

    /// Count the open tasks in `tasks` that are assigned to `member`.
    pub fn from_tasks<'a>(member: &Member, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let current_load = tasks.into_iter().filter(|t| t.is_open_for(member.id)).count();
        Self::new(member, current_load)
    }

    /// Capacity minus load. Negative when overloaded.
    pub fn available_capacity(&self) -> i64 {
        i64::from(self.capacity.get()) - self.current_load as i64
    }

    /// More open tasks than capacity.
    pub fn is_overloaded(&self) -> bool {
        self.current_load > self.capacity.get() as usize
    }

    /// Strictly below capacity, so one more task fits.
    pub fn has_room(&self) -> bool {
        self.current_load < self.capacity.get() as usize
    }

    /// How many tasks over capacity, zero when not overloaded.
    pub fn excess(&self) -> usize {
        self.current_load.saturating_sub(self.capacity.get() as usize)
    }

    /// Record one more task on this member.
    pub fn take_task(&mut self) {
        self.current_load += 1;
    }

    /// Record one task leaving this member. Load never drops below zero.
    pub fn release_task(&mut self) {
        self.current_load = self.current_load.saturating_sub(1);
    }
}

/// Loads for every member of a roster, in roster order.
pub fn member_loads(members: &[Member], tasks: &[Task]) -> Vec<MemberLoad> {
    members
        .iter()
        .map(|member| MemberLoad::from_tasks(member, tasks))
        .collect()
}
