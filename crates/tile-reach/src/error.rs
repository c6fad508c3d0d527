use thiserror::Error;

use crate::explorer::NodeId;
use crate::state::StateHash;

/// Broken invariants. None of these are expected outcomes: a walk that
/// loops or runs out of moves is counted, not reported here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReachError {
    #[error("tree node {node:?} has already been expanded")]
    NodeAlreadyExpanded { node: NodeId },
    #[error("state {hash:#018x} is missing from the state index")]
    UnknownState { hash: StateHash },
    #[error("state {hash:#018x} has no node in the transition graph")]
    NotInGraph { hash: StateHash },
    #[error("no state was reached at depth {depth}")]
    NoStateAtDepth { depth: usize },
}

pub type Result<T> = std::result::Result<T, ReachError>;
