//! Unique identifiers for Crewload entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Ulid);

        impl $name {
            #[doc = concat!("Generate a new ", stringify!($name))]
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(
    /// Unique identifier for a Team
    TeamId
);

define_id!(
    /// Unique identifier for a Member within a team
    MemberId
);

define_id!(
    /// Unique identifier for a Project
    ProjectId
);

define_id!(
    /// Unique identifier for a Task
    TaskId
);

define_id!(
    /// Unique identifier for an AssignmentEvent
    EventId
);

/// Identity of the user who owns teams, projects and tasks.
///
/// Authentication happens outside Crewload; this is just the opaque name the
/// caller acts as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    /// Create a new owner ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Owner used by the local CLI when none is given.
    pub fn local() -> Self {
        Self("local".to_string())
    }

    /// Borrow the raw identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_roundtrip() {
        let id = TaskId::new();
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_rejects_garbage() {
        assert!("not-a-ulid".parse::<MemberId>().is_err());
    }
}
