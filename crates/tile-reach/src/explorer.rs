//! Breadth-first reachability search from the solved state.
//!
//! Every node of the reachability tree is one minimal-length move sequence.
//! Layers are expanded strictly by depth, so the first time a state is seen
//! it is seen at its shortest distance from the solution. Later sightings
//! are kept as loop nodes and never expanded.

use std::collections::hash_map::Entry;
use std::collections::BTreeMap;

use fxhash::FxHashMap;
use log::{debug, info};
use smallvec::SmallVec;

use crate::error::{ReachError, Result};
use crate::geometry::{Geometry, Move};
use crate::graph::GraphId;
use crate::state::{State, StateHash, StateHasher};

/// Index of a node in the reachability tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One move sequence in the reachability tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub state_hash: StateHash,
    /// The state was already known when this node was created
    pub is_loop: bool,
    pub is_solution: bool,
    /// Parent node and the move taken from it. `None` for the root.
    pub prior: Option<(NodeId, Move)>,
    /// Length of the move sequence reaching this node
    pub input_count: usize,
    expanded: bool,
    // Children of one node are created together, so they sit in one run
    first_child: u32,
    child_count: u8,
}

impl TreeNode {
    fn new(state_hash: StateHash, is_solution: bool) -> Self {
        Self {
            state_hash,
            is_loop: false,
            is_solution,
            prior: None,
            input_count: 0,
            expanded: false,
            first_child: 0,
            child_count: 0,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

/// Arena holding every node of the reachability tree
#[derive(Debug, Clone, Default)]
pub struct ReachabilityTree {
    nodes: Vec<TreeNode>,
}

impl ReachabilityTree {
    fn with_root(root: TreeNode) -> Self {
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Children of `id` with the move leading to each
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (Move, NodeId)> + '_ {
        let node = self.node(id);
        let start = node.first_child;
        (start..start + node.child_count as u32).filter_map(move |child| {
            let child = NodeId(child);
            self.node(child).prior.map(|(_, mv)| (mv, child))
        })
    }

    /// The child reached from `id` by `mv`, if that edge was recorded
    pub fn then(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.children(id)
            .find(|&(child_move, _)| child_move == mv)
            .map(|(_, child)| child)
    }

    /// The moves leading from the root to `id`, in play order
    pub fn from_inputs(&self, id: NodeId) -> Vec<Move> {
        let mut inputs = Vec::with_capacity(self.node(id).input_count);
        let mut current = id;
        while let Some((parent, mv)) = self.node(current).prior {
            inputs.push(mv);
            current = parent;
        }
        inputs.reverse();
        inputs
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

/// Everything known about one distinct state
#[derive(Debug, Clone)]
pub struct StateRecord {
    pub state: State,
    /// Every tree node reaching this state at its minimal depth
    pub reached_by: SmallVec<[NodeId; 2]>,
    /// Shortest sequence length reaching this state
    pub depth: usize,
    /// Node in the transition graph, once the graph is built
    pub graph: Option<GraphId>,
}

impl StateRecord {
    fn new(state: State, reached_by: NodeId, depth: usize) -> Self {
        let mut nodes = SmallVec::new();
        nodes.push(reached_by);
        Self {
            state,
            reached_by: nodes,
            depth,
            graph: None,
        }
    }
}

/// Distinct states keyed by content hash
pub type StateDict = FxHashMap<StateHash, StateRecord>;

/// Exploration bounds
#[derive(Debug, Clone, Default)]
pub struct ExploreConfig {
    /// Stop after this many layers. `None` runs until no new state appears.
    pub max_depth: Option<usize>,
}

/// What a call to [`Board::explore`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploreSummary {
    /// Number of layers expanded by this call
    pub layers: usize,
    /// Depth of the deepest state discovered so far
    pub deepest: usize,
    /// True once a layer produced no new states
    pub closed: bool,
}

/// A board: its geometry plus the explored state space
#[derive(Debug, Clone)]
pub struct Board {
    geometry: Geometry,
    hasher: StateHasher,
    solution_hash: StateHash,
    index: StateDict,
    tree: ReachabilityTree,
    frontier: Vec<NodeId>,
}

impl Board {
    pub fn new(geometry: Geometry, hasher: StateHasher) -> Self {
        let solution = *geometry.solution();
        let solution_hash = hasher.hash(&solution);
        let tree = ReachabilityTree::with_root(TreeNode::new(solution_hash, true));

        let mut index = StateDict::default();
        index.insert(solution_hash, StateRecord::new(solution, tree.root(), 0));

        let frontier = vec![tree.root()];
        Self {
            geometry,
            hasher,
            solution_hash,
            index,
            tree,
            frontier,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn hasher(&self) -> &StateHasher {
        &self.hasher
    }

    pub fn tree(&self) -> &ReachabilityTree {
        &self.tree
    }

    pub fn states(&self) -> &StateDict {
        &self.index
    }

    pub fn state_count(&self) -> usize {
        self.index.len()
    }

    pub fn solution_hash(&self) -> StateHash {
        self.solution_hash
    }

    pub fn is_solution(&self, hash: StateHash) -> bool {
        self.solution_hash == hash
    }

    pub fn hash(&self, state: &State) -> StateHash {
        self.hasher.hash(state)
    }

    pub fn record(&self, hash: StateHash) -> Result<&StateRecord> {
        self.index.get(&hash).ok_or(ReachError::UnknownState { hash })
    }

    pub(crate) fn record_mut(&mut self, hash: StateHash) -> Result<&mut StateRecord> {
        self.index
            .get_mut(&hash)
            .ok_or(ReachError::UnknownState { hash })
    }

    /// Distinct state hashes in the order they were discovered
    pub fn discovery_order(&self) -> impl Iterator<Item = StateHash> + '_ {
        self.tree
            .nodes
            .iter()
            .filter(|node| !node.is_loop)
            .map(|node| node.state_hash)
    }

    /// Expand one tree node, pushing the nodes that reached new states onto
    /// `next_layer`.
    ///
    /// The inverse of the move that created the node is never tried, and
    /// moves that leave the state unchanged are skipped.
    pub fn reachability_step(&mut self, from: NodeId, next_layer: &mut Vec<NodeId>) -> Result<()> {
        let node = *self.tree.node(from);
        if node.expanded {
            return Err(ReachError::NodeAlreadyExpanded { node: from });
        }
        let current = self.record(node.state_hash)?.state;
        let backtrack = node.prior.map(|(_, mv)| mv.inverse());
        let depth = node.input_count + 1;

        let first_child = self.tree.nodes.len() as u32;
        let mut child_count = 0u8;

        for mv in Move::ALL {
            if Some(mv) == backtrack {
                continue;
            }
            let next = current.apply(&self.geometry, mv);
            let next_hash = self.hasher.hash(&next);
            if next_hash == node.state_hash {
                continue;
            }

            let known = self.index.contains_key(&next_hash);
            let child = self.tree.push(TreeNode {
                is_loop: known,
                prior: Some((from, mv)),
                input_count: depth,
                ..TreeNode::new(next_hash, next_hash == self.solution_hash)
            });
            child_count += 1;

            match self.index.entry(next_hash) {
                Entry::Occupied(mut entry) => {
                    // Reached before by a sequence no longer than this one
                    let record = entry.get_mut();
                    if record.depth == depth {
                        record.reached_by.push(child);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(StateRecord::new(next, child, depth));
                    next_layer.push(child);
                }
            }
        }

        let expanded = &mut self.tree.nodes[from.index()];
        expanded.expanded = true;
        expanded.first_child = first_child;
        expanded.child_count = child_count;
        Ok(())
    }

    /// Expand the frontier layer by layer until no new state appears or
    /// `config.max_depth` layers have been expanded.
    ///
    /// A bounded call leaves the last layer as the frontier, so calling
    /// again continues where the previous call stopped.
    pub fn explore(&mut self, config: &ExploreConfig) -> Result<ExploreSummary> {
        let mut layers = 0;
        let mut next_layer = Vec::new();

        while !self.frontier.is_empty() {
            if config.max_depth.is_some_and(|max| layers >= max) {
                break;
            }
            layers += 1;

            let layer = std::mem::take(&mut self.frontier);
            for &node in &layer {
                self.reachability_step(node, &mut next_layer)?;
            }
            debug!(
                "layer {}: {} nodes expanded, {} new states",
                self.tree.node(layer[0]).input_count,
                layer.len(),
                next_layer.len()
            );

            if next_layer.is_empty() {
                break;
            }
            self.frontier = std::mem::take(&mut next_layer);
        }

        let summary = ExploreSummary {
            layers,
            deepest: self.deepest(),
            closed: self.frontier.is_empty(),
        };
        info!(
            "explored {} layers: {} states, {} tree nodes, deepest {}{}",
            summary.layers,
            self.index.len(),
            self.tree.len(),
            summary.deepest,
            if summary.closed { " (closed)" } else { "" }
        );
        Ok(summary)
    }

    fn deepest(&self) -> usize {
        self.index.values().map(|r| r.depth).max().unwrap_or(0)
    }

    /// Minimal tree nodes grouped by depth, and the number of distinct states
    /// whose shortest sequence has each depth.
    pub fn trees_by_input_len(&self) -> (BTreeMap<usize, Vec<NodeId>>, BTreeMap<usize, usize>) {
        let mut minimal_sequences: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        let mut state_counts: BTreeMap<usize, usize> = BTreeMap::new();
        for record in self.index.values() {
            minimal_sequences
                .entry(record.depth)
                .or_default()
                .extend(record.reached_by.iter().copied());
            *state_counts.entry(record.depth).or_default() += 1;
        }
        for nodes in minimal_sequences.values_mut() {
            nodes.sort_unstable();
        }
        (minimal_sequences, state_counts)
    }

    /// The first state discovered at `depth`
    pub fn example_at_depth(&self, depth: usize) -> Result<NodeId> {
        self.tree
            .iter()
            .find(|(_, node)| !node.is_loop && node.input_count == depth)
            .map(|(id, _)| id)
            .ok_or(ReachError::NoStateAtDepth { depth })
    }

    /// States along the path from the solution to `id`, both ends included
    pub fn states_reaching(&self, id: NodeId) -> Result<Vec<State>> {
        let mut states = Vec::with_capacity(self.tree.node(id).input_count + 1);
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.tree.node(node_id);
            states.push(self.record(node.state_hash)?.state);
            current = node.prior.map(|(parent, _)| parent);
        }
        states.reverse();
        Ok(states)
    }

    /// Apply `inputs` to `state` in order, returning every state visited
    /// including the starting one.
    pub fn replay(&self, state: &State, inputs: &[Move]) -> Vec<State> {
        let mut states = Vec::with_capacity(inputs.len() + 1);
        states.push(*state);
        let mut current = *state;
        for &mv in inputs {
            current = current.apply(&self.geometry, mv);
            states.push(current);
        }
        states
    }
}
