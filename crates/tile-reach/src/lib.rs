//! State-space exploration for a tile-rotation puzzle.
//!
//! This crate enumerates every board state reachable from the solved
//! state, links those states into a transition graph, and estimates by
//! random walks how often a bounded sequence of moves solves the board.

pub mod error;
pub mod explorer;
pub mod geometry;
pub mod graph;
pub mod sequences;
pub mod simulation;
pub mod state;

// Re-export main types
pub use error::{ReachError, Result};
pub use explorer::{Board, ExploreConfig, ExploreSummary, NodeId, ReachabilityTree, StateDict, StateRecord, TreeNode};
pub use geometry::{invert, Geometry, Move, MoveTo, Position, Rotation, RotationDelta, Tile, Transform};
pub use graph::{GraphId, GraphNode, TransitionGraph};
pub use sequences::{count_input_sequences, unique_input_sequences, InputSequence, SequenceClasses, SequenceCounts};
pub use simulation::{random_walk, simulate_inputs, SimulationConfig, SimulationResult, WalkOutcome};
pub use state::{State, StateHash, StateHasher, TileState};
