//! Errors raised by the balancing engine.

use crewload_core::TeamId;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, BalanceError>;

/// Failures of the balancing engine.
///
/// An overloaded member that could not be relieved is not an error; it is
/// reported in [`crate::RebalanceOutcome::unresolved`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// There is nobody to hand the task to
    #[error("no team members available for assignment")]
    NoCandidates {
        /// Team that was searched, when known
        team: Option<TeamId>,
    },
}
