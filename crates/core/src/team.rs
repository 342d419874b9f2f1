//! Team model - members and their task capacity.

use serde::{Deserialize, Serialize};
use crate::id::{MemberId, OwnerId, TeamId};
use crate::Time;

/// Maximum number of open tasks a member should hold at once.
///
/// Always within `0..=Capacity::MAX`. Values outside that range are clamped
/// on construction, and deserialization goes through the same clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Capacity(u8);

impl Capacity {
    /// Upper bound of the capacity scale.
    pub const MAX: u8 = 5;

    /// Capacity given to members created without one.
    pub const DEFAULT: u8 = 3;

    /// Build a capacity, clamping into `0..=MAX`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }

    /// Whether `value` is already inside `0..=MAX`.
    pub fn in_range(value: i64) -> bool {
        (0..=Self::MAX as i64).contains(&value)
    }

    /// The raw value.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for Capacity {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Capacity> for i64 {
    fn from(capacity: Capacity) -> Self {
        capacity.0 as i64
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A person who can be assigned tasks.
///
/// A member carries no load counter. Load is derived from the live task set
/// every time it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: MemberId,

    /// Display name
    pub name: String,

    /// Role within the team
    pub role: String,

    /// Task capacity
    pub capacity: Capacity,
}

impl Member {
    /// Create a new member.
    pub fn new(name: impl Into<String>, role: impl Into<String>, capacity: Capacity) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            role: role.into(),
            capacity,
        }
    }
}

/// A team owns an ordered roster of members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    pub id: TeamId,

    /// Team name
    pub name: String,

    /// Who owns the team
    pub owner: OwnerId,

    /// Members, in roster order
    pub members: Vec<Member>,

    /// When created
    pub created_at: Time,
}

impl Team {
    /// Create an empty team.
    pub fn new(name: impl Into<String>, owner: OwnerId) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            owner,
            members: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Look up a member by id.
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Mutable member lookup.
    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Append a member to the roster. A member whose id is already present
    /// is not added twice; the existing entry is returned unchanged.
    pub fn add_member(&mut self, member: Member) -> &Member {
        let index = match self.members.iter().position(|m| m.id == member.id) {
            Some(index) => index,
            None => {
                self.members.push(member);
                self.members.len() - 1
            }
        };
        &self.members[index]
    }

    /// Remove a member, returning it if it was on the roster.
    pub fn remove_member(&mut self, id: MemberId) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_clamps() {
        assert_eq!(Capacity::clamped(-2).get(), 0);
        assert_eq!(Capacity::clamped(4).get(), 4);
        assert_eq!(Capacity::clamped(9).get(), Capacity::MAX);
        assert_eq!(Capacity::default().get(), 3);
        assert!(!Capacity::in_range(6));
    }

    #[test]
    fn test_capacity_deserialize_clamps() {
        let capacity: Capacity = serde_json::from_str("12").unwrap();
        assert_eq!(capacity.get(), 5);
        assert_eq!(serde_json::to_string(&capacity).unwrap(), "5");
    }

    #[test]
    fn test_team_roster() {
        let mut team = Team::new("Platform", OwnerId::local());
        let alice = Member::new("Alice", "Backend", Capacity::clamped(2));
        let alice_id = alice.id;
        team.add_member(alice.clone());
        team.add_member(alice);
        team.add_member(Member::new("Bob", "Frontend", Capacity::default()));

        assert_eq!(team.members.len(), 2);
        assert_eq!(team.member(alice_id).unwrap().name, "Alice");

        let removed = team.remove_member(alice_id).unwrap();
        assert_eq!(removed.name, "Alice");
        assert!(team.member(alice_id).is_none());
        assert!(team.remove_member(alice_id).is_none());
        assert_eq!(team.members[0].name, "Bob");
    }
}
