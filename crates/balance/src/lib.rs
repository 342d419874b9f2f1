//! Balancing engine - who gets a task, and what moves when someone is overloaded.
//!
//! Everything here works over in-memory snapshots and never locks or touches
//! storage, except the [`EventEmitter`] which appends to an activity sink.

#![warn(missing_docs)]

pub mod capacity;
pub mod selector;
pub mod rebalancer;
pub mod emitter;
pub mod error;

pub use capacity::{member_loads, MemberLoad};
pub use selector::{select_target, FirstAvailable, MemberSelector, MostAvailable, SelectorStrategy};
pub use rebalancer::{
    apply_moves, MemberRef, PartialRebalance, Rebalancer, RebalanceOutcome, Reassignment,
    TeamSnapshot, UnresolvedReason,
};
pub use emitter::EventEmitter;
pub use error::{BalanceError, Result};
