//! Flat transition graph over the explored states.
//!
//! Built once after exploration by replaying every move from every known
//! state. Each link is recorded in both directions, so the destination's
//! inverse move never has to be recomputed.

use fxhash::FxHashMap;
use log::info;

use crate::error::{ReachError, Result};
use crate::explorer::Board;
use crate::geometry::{Move, MOVE_COUNT};
use crate::state::StateHash;

/// Index of a node in the transition graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphId(u32);

impl GraphId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One distinct state and where each move takes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub state_hash: StateHash,
    links: [Option<GraphId>; MOVE_COUNT],
}

impl GraphNode {
    fn new(state_hash: StateHash) -> Self {
        Self {
            state_hash,
            links: [None; MOVE_COUNT],
        }
    }

    pub fn link(&self, mv: Move) -> Option<GraphId> {
        self.links[mv.index()]
    }
}

/// States linked by moves. Nodes refer to each other by index only.
#[derive(Debug, Clone)]
pub struct TransitionGraph {
    nodes: Vec<GraphNode>,
    index: FxHashMap<StateHash, GraphId>,
    solution_hash: StateHash,
}

impl TransitionGraph {
    /// An empty graph for `board`; call [`TransitionGraph::link_states`] to fill it.
    pub fn new(board: &Board) -> Self {
        Self {
            nodes: Vec::with_capacity(board.state_count()),
            index: FxHashMap::default(),
            solution_hash: board.solution_hash(),
        }
    }

    /// Build the graph over every state the board has discovered.
    pub fn build(board: &mut Board) -> Result<Self> {
        let mut graph = Self::new(board);
        graph.link_states(board)?;
        Ok(graph)
    }

    /// Link every unlinked move slot of every discovered state. Returns the
    /// number of move slots linked by this call; a second call links nothing.
    ///
    /// A move that leads outside the board's state index is an error: the
    /// board has not been explored to closure.
    pub fn link_states(&mut self, board: &mut Board) -> Result<usize> {
        let hashes: Vec<StateHash> = board.discovery_order().collect();
        let mut linked = 0;

        for hash in hashes {
            let source = self.node_for(board, hash)?;
            let state = board.record(hash)?.state;
            for mv in Move::ALL {
                if self.nodes[source.index()].link(mv).is_some() {
                    continue;
                }
                let next_hash = board.hash(&state.apply(board.geometry(), mv));
                let dest = self.node_for(board, next_hash)?;

                self.nodes[source.index()].links[mv.index()] = Some(dest);
                self.nodes[dest.index()].links[mv.inverse().index()] = Some(source);
                linked += 1;
            }
        }

        info!(
            "transition graph: {} nodes, {} new links",
            self.nodes.len(),
            linked
        );
        Ok(linked)
    }

    // The graph's own index decides node identity; `record.graph` only
    // mirrors the most recently built graph.
    fn node_for(&mut self, board: &mut Board, hash: StateHash) -> Result<GraphId> {
        let record = board.record_mut(hash)?;
        if let Some(&id) = self.index.get(&hash) {
            record.graph = Some(id);
            return Ok(id);
        }
        let id = GraphId(self.nodes.len() as u32);
        self.nodes.push(GraphNode::new(hash));
        self.index.insert(hash, id);
        record.graph = Some(id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: GraphId) -> &GraphNode {
        &self.nodes[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (GraphId, &GraphNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (GraphId(i as u32), node))
    }

    /// Graph node for a state hash
    pub fn lookup(&self, hash: StateHash) -> Result<GraphId> {
        self.index
            .get(&hash)
            .copied()
            .ok_or(ReachError::NotInGraph { hash })
    }

    /// Where `mv` takes the state at `from`
    pub fn step(&self, from: GraphId, mv: Move) -> Option<GraphId> {
        self.node(from).link(mv)
    }

    pub fn is_solution(&self, id: GraphId) -> bool {
        self.node(id).state_hash == self.solution_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ExploreConfig;
    use crate::geometry::{Geometry, Position, Tile, POSITION_COUNT};
    use crate::state::{State, StateHasher, TileState};

    fn explored_board() -> Board {
        let reference = Geometry::simple_3x5();
        let mut cells = [TileState::new(Tile::Blue); POSITION_COUNT];
        cells[Position::at(1, 1).index()] = TileState::new(Tile::Red);
        cells[Position::at(3, 5).index()] = TileState::new(Tile::Green);
        let transforms = Move::ALL.map(|mv| reference.transform(mv).clone());
        let mut board = Board::new(
            Geometry::new(transforms, State::from_tiles(cells)),
            StateHasher::new(),
        );
        board.explore(&ExploreConfig::default()).unwrap();
        board
    }

    #[test]
    fn test_every_state_gets_a_node() {
        let mut board = explored_board();
        let graph = TransitionGraph::build(&mut board).unwrap();

        assert_eq!(graph.len(), board.state_count());
        for (hash, record) in board.states() {
            let id = record.graph.unwrap();
            assert_eq!(graph.lookup(*hash).unwrap(), id);
            assert_eq!(graph.node(id).state_hash, *hash);
        }
        assert!(graph.is_solution(graph.lookup(board.solution_hash()).unwrap()));
    }

    #[test]
    fn test_links_match_transforms() {
        let mut board = explored_board();
        let graph = TransitionGraph::build(&mut board).unwrap();

        for (id, node) in graph.iter() {
            let state = board.record(node.state_hash).unwrap().state;
            for mv in Move::ALL {
                let expected = board.hash(&state.apply(board.geometry(), mv));
                let next = graph.step(id, mv).unwrap();
                assert_eq!(graph.node(next).state_hash, expected);
            }
        }
    }

    #[test]
    fn test_links_are_bidirectional() {
        let mut board = explored_board();
        let graph = TransitionGraph::build(&mut board).unwrap();

        for (id, _) in graph.iter() {
            for mv in Move::ALL {
                let next = graph.step(id, mv).unwrap();
                assert_eq!(graph.step(next, mv.inverse()), Some(id));
            }
        }
    }

    #[test]
    fn test_relinking_is_a_no_op() {
        let mut board = explored_board();
        let mut graph = TransitionGraph::build(&mut board).unwrap();
        let before: Vec<GraphNode> = graph.iter().map(|(_, n)| n.clone()).collect();

        assert_eq!(graph.link_states(&mut board).unwrap(), 0);
        let after: Vec<GraphNode> = graph.iter().map(|(_, n)| n.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rebuilding_gives_the_same_graph() {
        let mut board = explored_board();
        let first = TransitionGraph::build(&mut board).unwrap();
        let second = TransitionGraph::build(&mut board).unwrap();

        assert_eq!(first.len(), second.len());
        for ((a, node_a), (b, node_b)) in first.iter().zip(second.iter()) {
            assert_eq!(a, b);
            assert_eq!(node_a, node_b);
        }
        for (hash, record) in board.states() {
            assert_eq!(record.graph, Some(second.lookup(*hash).unwrap()));
        }
    }

    #[test]
    fn test_unclosed_board_is_rejected() {
        let reference = Geometry::simple_3x5();
        let mut board = Board::new(reference, StateHasher::new());
        board
            .explore(&ExploreConfig { max_depth: Some(1) })
            .unwrap();

        let err = TransitionGraph::build(&mut board).unwrap_err();
        assert!(matches!(err, ReachError::UnknownState { .. }));
    }
}
