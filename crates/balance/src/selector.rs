//! Member selection strategies.
//!
//! Auto-assignment and rebalancing pick members differently and must keep
//! doing so: auto-assignment takes the member with the most spare capacity,
//! rebalancing takes the first member in roster order that has any room.

use crewload_core::MemberId;
use crate::capacity::MemberLoad;
use crate::error::{BalanceError, Result};

/// Strategy for choosing a member to receive a task.
pub trait MemberSelector: Send + Sync {
    /// Index of the chosen candidate, skipping `exclude`. `None` when no
    /// candidate qualifies.
    fn select(&self, candidates: &[MemberLoad], exclude: Option<MemberId>) -> Option<usize>;
}

/// Greatest available capacity wins; the earliest candidate wins ties.
///
/// Members already at or over capacity still qualify, so a non-empty
/// candidate set always produces a choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostAvailable;

impl MemberSelector for MostAvailable {
    fn select(&self, candidates: &[MemberLoad], exclude: Option<MemberId>) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if Some(candidate.member) == exclude {
                continue;
            }
            let available = candidate.available_capacity();
            // Strictly greater keeps the first of equals
            if best.map_or(true, |(_, top)| available > top) {
                best = Some((index, available));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// First candidate in input order whose load is below capacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl MemberSelector for FirstAvailable {
    fn select(&self, candidates: &[MemberLoad], exclude: Option<MemberId>) -> Option<usize> {
        candidates
            .iter()
            .position(|c| Some(c.member) != exclude && c.has_room())
    }
}

/// Selector strategies available.
#[derive(Debug, Clone, Copy)]
pub enum SelectorStrategy {
    /// Auto-assignment policy
    MostAvailable(MostAvailable),
    /// Rebalance destination policy
    FirstAvailable(FirstAvailable),
}

impl SelectorStrategy {
    /// Strategy used when assigning a single task.
    pub fn auto_assign() -> Self {
        Self::MostAvailable(MostAvailable)
    }

    /// Strategy used to place tasks evicted during rebalancing.
    pub fn rebalance_destination() -> Self {
        Self::FirstAvailable(FirstAvailable)
    }
}

impl MemberSelector for SelectorStrategy {
    fn select(&self, candidates: &[MemberLoad], exclude: Option<MemberId>) -> Option<usize> {
        match self {
            Self::MostAvailable(s) => s.select(candidates, exclude),
            Self::FirstAvailable(s) => s.select(candidates, exclude),
        }
    }
}

/// Pick the best member for one task under the auto-assignment policy.
pub fn select_target(candidates: &[MemberLoad]) -> Result<&MemberLoad> {
    MostAvailable
        .select(candidates, None)
        .map(|index| &candidates[index])
        .ok_or(BalanceError::NoCandidates { team: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewload_core::{Capacity, Member};

    fn load(name: &str, capacity: i64, current: usize) -> MemberLoad {
        MemberLoad::new(&Member::new(name, "Dev", Capacity::clamped(capacity)), current)
    }

    #[test]
    fn test_select_target_prefers_most_room() {
        let candidates = vec![load("M1", 3, 3), load("M2", 3, 1)];
        let chosen = select_target(&candidates).unwrap();
        assert_eq!(chosen.name, "M2");
        assert_eq!(chosen.available_capacity(), 2);
    }

    #[test]
    fn test_select_target_ties_go_to_first() {
        let candidates = vec![load("M1", 2, 1), load("M2", 4, 3), load("M3", 3, 2)];
        assert_eq!(select_target(&candidates).unwrap().name, "M1");
    }

    #[test]
    fn test_select_target_is_maximal() {
        let candidates = vec![load("A", 1, 3), load("B", 5, 2), load("C", 4, 0), load("D", 2, 2)];
        let chosen = select_target(&candidates).unwrap();
        let best = candidates.iter().map(|c| c.available_capacity()).max().unwrap();
        assert_eq!(chosen.available_capacity(), best);
        assert_eq!(chosen.name, "C");
    }

    #[test]
    fn test_select_target_takes_overloaded_when_nobody_has_room() {
        let candidates = vec![load("M1", 1, 4), load("M2", 2, 3)];
        assert_eq!(select_target(&candidates).unwrap().name, "M2");
    }

    #[test]
    fn test_select_target_empty() {
        assert_eq!(
            select_target(&[]).unwrap_err(),
            BalanceError::NoCandidates { team: None }
        );
    }

    #[test]
    fn test_first_available_scans_in_order() {
        let candidates = vec![load("Full", 2, 2), load("Some", 3, 2), load("Empty", 5, 0)];
        // Not the member with the most room, just the first one with any
        assert_eq!(FirstAvailable.select(&candidates, None), Some(1));
    }

    #[test]
    fn test_first_available_honours_exclude() {
        let candidates = vec![load("Source", 3, 0), load("Other", 3, 3)];
        let source = candidates[0].member;
        assert_eq!(FirstAvailable.select(&candidates, Some(source)), None);
        assert_eq!(MostAvailable.select(&candidates, Some(source)), Some(1));
    }

    #[test]
    fn test_strategies_disagree() {
        let candidates = vec![load("Some", 3, 2), load("Empty", 5, 0)];
        assert_eq!(SelectorStrategy::rebalance_destination().select(&candidates, None), Some(0));
        assert_eq!(SelectorStrategy::auto_assign().select(&candidates, None), Some(1));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let candidates = vec![load("A", 3, 1), load("B", 3, 1), load("C", 2, 0)];
        let first = select_target(&candidates).unwrap().member;
        for _ in 0..10 {
            assert_eq!(select_target(&candidates).unwrap().member, first);
        }
    }
}
