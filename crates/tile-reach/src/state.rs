//! Board state, content hashing and move application.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

use crate::geometry::{Geometry, Move, Position, Rotation, Tile, BOARD_HEIGHT, BOARD_WIDTH, POSITION_COUNT};

/// Content hash of a state's tile layout
pub type StateHash = u64;

/// A cell's content: which tile, at which orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileState {
    pub tile: Tile,
    pub rotation: Rotation,
}

impl TileState {
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            rotation: Rotation::ZERO,
        }
    }
}

/// A total assignment of tiles to every board position.
///
/// Equality compares tile identities only; rotation is ignored, matching
/// the hash. A rotated copy of the solution counts as solved.
#[derive(Debug, Clone, Copy)]
pub struct State {
    cells: [TileState; POSITION_COUNT],
}

impl State {
    pub fn from_tiles(cells: [TileState; POSITION_COUNT]) -> Self {
        Self { cells }
    }

    pub fn get(&self, position: Position) -> TileState {
        self.cells[position.index()]
    }

    /// Position-ordered, fixed-width layout of tile labels
    pub fn layout(&self) -> [u8; POSITION_COUNT] {
        let mut layout = [0u8; POSITION_COUNT];
        for (label, cell) in layout.iter_mut().zip(&self.cells) {
            *label = cell.tile.label();
        }
        layout
    }

    /// Apply one move, returning the new state. `self` is left untouched.
    pub fn apply(&self, geometry: &Geometry, mv: Move) -> State {
        let mut next = *self;
        for (source, target) in geometry.transform(mv).entries() {
            let old = self.cells[source.index()];
            next.cells[target.position.index()] = TileState {
                tile: old.tile,
                rotation: old.rotation.turned(target.rotation),
            };
        }
        next
    }

    /// Rows of tile labels, top row first
    pub fn rows(&self) -> Vec<String> {
        (0..BOARD_HEIGHT)
            .rev()
            .map(|row| {
                self.cells[row * BOARD_WIDTH..(row + 1) * BOARD_WIDTH]
                    .iter()
                    .map(|cell| cell.tile.label() as char)
                    .collect::<String>()
            })
            .collect()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.layout() == other.layout()
    }
}

impl Eq for State {}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rows().join("\n"))
    }
}

/// Keyed hashing context for states.
///
/// The key is drawn once when the hasher is created, so hashes are stable for
/// the life of one hasher but are not comparable across processes.
#[derive(Debug, Clone, Default)]
pub struct StateHasher {
    keys: RandomState,
}

impl StateHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, state: &State) -> StateHash {
        self.keys.hash_one(state.layout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MoveTo, RotationDelta, Transform};

    fn rotated(state: &State, by: i32) -> State {
        let mut cells = state.cells;
        for cell in &mut cells {
            cell.rotation = Rotation::new(by);
        }
        State::from_tiles(cells)
    }

    #[test]
    fn test_apply_column_up() {
        let geometry = Geometry::simple_3x5();
        let mut cells = geometry.solution().cells;
        cells[Position::at(1, 5).index()] = TileState::new(Tile::Blue);
        let start = State::from_tiles(cells);

        let next = start.apply(&geometry, Move::Up1);
        assert_eq!(next.get(Position::at(1, 1)).tile, Tile::Blue);
        assert_eq!(next.get(Position::at(1, 5)).tile, Tile::Red);
        // The input is not modified.
        assert_eq!(start.get(Position::at(1, 5)).tile, Tile::Blue);
    }

    #[test]
    fn test_apply_turns_tiles() {
        let a = Position::at(1, 1);
        let b = Position::at(2, 1);
        let turn = Transform::from_pairs([(
            a,
            MoveTo {
                position: b,
                rotation: RotationDelta(3),
            },
        )]);
        let solution = *Geometry::simple_3x5().solution();
        let mut transforms: [Transform; crate::geometry::MOVE_COUNT] = Default::default();
        transforms[Move::Up1.index()] = turn;
        let geometry = Geometry::new(transforms, solution);

        let once = solution.apply(&geometry, Move::Up1);
        assert_eq!(once.get(b).tile, Tile::Red);
        assert_eq!(once.get(b).rotation.quarter_turns(), 3);
        // Not a source, only a destination: the source keeps its old tile.
        assert_eq!(once.get(a).tile, Tile::Red);

        let twice = once.apply(&geometry, Move::Up1);
        assert_eq!(twice.get(b).rotation.quarter_turns(), 3);
    }

    #[test]
    fn test_hash_ignores_rotation() {
        let hasher = StateHasher::new();
        let solution = *Geometry::simple_3x5().solution();
        let turned = rotated(&solution, 2);

        assert_eq!(solution, turned);
        assert_eq!(hasher.hash(&solution), hasher.hash(&turned));
        assert_eq!(hasher.hash(&solution), hasher.hash(&solution));
    }

    #[test]
    fn test_hash_distinguishes_layouts() {
        let geometry = Geometry::simple_3x5();
        let hasher = StateHasher::new();
        let solution = geometry.solution();
        let moved = solution.apply(&geometry, Move::Left);

        assert_ne!(*solution, moved);
        assert_ne!(hasher.hash(solution), hasher.hash(&moved));
    }

    #[test]
    fn test_render_bottom_row_last() {
        let geometry = Geometry::simple_3x5();
        let mut cells = geometry.solution().cells;
        cells[Position::at(1, 1).index()] = TileState::new(Tile::Blue);
        let state = State::from_tiles(cells);

        let rendered = state.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), BOARD_HEIGHT);
        assert_eq!(lines[0], "RGB");
        assert_eq!(lines[BOARD_HEIGHT - 1], "BGB");
    }
}
