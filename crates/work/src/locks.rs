//! Per-team mutual exclusion.
//!
//! Every read-decide-write sequence over a team's assignments runs while
//! holding that team's guard, so two requests never act on the same stale
//! load counts.

use std::collections::HashMap;
use std::sync::Arc;
use crewload_core::TeamId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per team, created on first use.
#[derive(Debug, Default)]
pub struct TeamLocks {
    locks: Mutex<HashMap<TeamId, Arc<Mutex<()>>>>,
}

impl TeamLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `team`.
    pub async fn lock(&self, team: TeamId) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().await.entry(team).or_default().clone();
        lock.lock_owned().await
    }

    /// Forget the lock of a deleted team.
    pub async fn forget(&self, team: TeamId) {
        self.locks.lock().await.remove(&team);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_team_serializes() {
        let locks = Arc::new(TeamLocks::new());
        let team = TeamId::new();

        let guard = locks.lock(team).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(team).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_teams_do_not_wait() {
        let locks = TeamLocks::new();
        let _first = locks.lock(TeamId::new()).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock(TeamId::new())).await;
        assert!(second.is_ok());
    }
}
