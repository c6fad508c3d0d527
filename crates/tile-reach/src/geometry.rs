//! Board geometry: positions, tiles, rotations and the move table.
//!
//! The geometry is a fixed configuration table. Moves are a closed
//! enumeration so every lookup table is an array indexed by `Move::index`.

use serde::{Deserialize, Serialize};

use crate::state::{State, TileState};

/// Board width in cells
pub const BOARD_WIDTH: usize = 3;
/// Board height in cells
pub const BOARD_HEIGHT: usize = 5;
/// Number of cells on the board
pub const POSITION_COUNT: usize = BOARD_WIDTH * BOARD_HEIGHT;
/// Number of moves in the move set
pub const MOVE_COUNT: usize = 8;

/// One board cell.
///
/// Positions are numbered row-major from the bottom-left cell, so the first
/// row holds positions 0..BOARD_WIDTH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(u8);

impl Position {
    pub const FIRST: Position = Position(0);
    pub const LAST: Position = Position(POSITION_COUNT as u8 - 1);

    /// Cell at 1-based `column` and `row`, matching the `p<column><row>` naming
    /// used by the reference board. Panics outside `1..=3` by `1..=5`.
    pub const fn at(column: usize, row: usize) -> Position {
        assert!(
            column >= 1 && column <= BOARD_WIDTH && row >= 1 && row <= BOARD_HEIGHT,
            "position out of range"
        );
        Position(((row - 1) * BOARD_WIDTH + (column - 1)) as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..POSITION_COUNT as u8).map(Position)
    }
}

/// Tile identity. Two tiles with the same colour are indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tile {
    Red,
    Green,
    Blue,
}

impl Tile {
    /// Fixed-width label used for rendering and hashing
    pub fn label(self) -> u8 {
        match self {
            Tile::Red => b'R',
            Tile::Green => b'G',
            Tile::Blue => b'B',
        }
    }
}

/// Absolute quarter-turn orientation, always in 0..4.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rotation(u8);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);

    pub fn new(quarter_turns: i32) -> Self {
        Rotation(quarter_turns.rem_euclid(4) as u8)
    }

    pub fn quarter_turns(self) -> u8 {
        self.0
    }

    pub fn turned(self, delta: RotationDelta) -> Rotation {
        Rotation::new(self.0 as i32 + delta.0 as i32)
    }
}

/// Relative quarter turns applied by a move. May be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationDelta(pub i8);

impl RotationDelta {
    pub const NONE: RotationDelta = RotationDelta(0);

    pub fn inverse(self) -> RotationDelta {
        RotationDelta((-(self.0 as i32)).rem_euclid(4) as i8)
    }
}

/// Where a tile lands when a move is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveTo {
    pub position: Position,
    pub rotation: RotationDelta,
}

impl MoveTo {
    pub const fn new(position: Position) -> Self {
        Self {
            position,
            rotation: RotationDelta::NONE,
        }
    }
}

/// How one move permutes and re-rotates tiles.
///
/// Indexed by source position; positions that are not a source keep their
/// tile unless they are overwritten as a destination. Must be injective.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transform {
    targets: [Option<MoveTo>; POSITION_COUNT],
}

impl Transform {
    /// The transform that moves nothing
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Position, MoveTo)>,
    {
        let mut transform = Self::default();
        for (source, target) in pairs {
            transform.targets[source.index()] = Some(target);
        }
        transform
    }

    /// Iterate over `(source, destination)` entries in position order
    pub fn entries(&self) -> impl Iterator<Item = (Position, MoveTo)> + '_ {
        Position::all().filter_map(move |p| self.targets[p.index()].map(|t| (p, t)))
    }

    pub fn target(&self, source: Position) -> Option<MoveTo> {
        self.targets[source.index()]
    }

    pub fn is_identity(&self) -> bool {
        self.targets.iter().all(Option::is_none)
    }
}

/// Swap sources and destinations, negating each rotation delta.
pub fn invert(transform: &Transform) -> Transform {
    Transform::from_pairs(transform.entries().map(|(source, target)| {
        (
            target.position,
            MoveTo {
                position: source,
                rotation: target.rotation.inverse(),
            },
        )
    }))
}

/// A move from the fixed move set. Every move has an inverse in the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up1,
    Down1,
    Up2,
    Down2,
    Up3,
    Down3,
    Left,
    Right,
}

impl Move {
    /// Every move, in the order the explorer and simulator try them
    pub const ALL: [Move; MOVE_COUNT] = [
        Move::Up1,
        Move::Down1,
        Move::Up2,
        Move::Down2,
        Move::Up3,
        Move::Down3,
        Move::Left,
        Move::Right,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn inverse(self) -> Move {
        match self {
            Move::Up1 => Move::Down1,
            Move::Down1 => Move::Up1,
            Move::Up2 => Move::Down2,
            Move::Down2 => Move::Up2,
            Move::Up3 => Move::Down3,
            Move::Down3 => Move::Up3,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Up1 => "up1",
            Move::Down1 => "down1",
            Move::Up2 => "up2",
            Move::Down2 => "down2",
            Move::Up3 => "up3",
            Move::Down3 => "down3",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The static configuration the explorer consumes: one transform per move
/// and the solved assignment of tiles to positions.
#[derive(Debug, Clone)]
pub struct Geometry {
    transforms: [Transform; MOVE_COUNT],
    solution: State,
}

impl Geometry {
    pub fn new(transforms: [Transform; MOVE_COUNT], solution: State) -> Self {
        Self {
            transforms,
            solution,
        }
    }

    /// Build a geometry from the "forward" half of the move set; each
    /// inverse move's transform is derived with [`invert`].
    pub fn from_forward_moves<I>(forward: I, solution: State) -> Self
    where
        I: IntoIterator<Item = (Move, Transform)>,
    {
        let mut transforms: [Transform; MOVE_COUNT] = Default::default();
        for (mv, transform) in forward {
            transforms[mv.inverse().index()] = invert(&transform);
            transforms[mv.index()] = transform;
        }
        Self::new(transforms, solution)
    }

    /// The reference 3x5 board: three colour columns that rotate up or down,
    /// plus an eight-cell ring around the centre that shifts left or right.
    pub fn simple_3x5() -> Self {
        let column = |c: usize| {
            Transform::from_pairs((1..=BOARD_HEIGHT).map(|row| {
                let next = if row == BOARD_HEIGHT { 1 } else { row + 1 };
                (Position::at(c, row), MoveTo::new(Position::at(c, next)))
            }))
        };

        let ring = Transform::from_pairs(
            [
                ((1, 2), (1, 4)),
                ((2, 2), (1, 3)),
                ((3, 2), (1, 2)),
                ((1, 3), (2, 4)),
                ((1, 4), (3, 4)),
                ((2, 4), (3, 3)),
                ((3, 4), (3, 2)),
                ((3, 3), (2, 2)),
            ]
            .into_iter()
            .map(|((sc, sr), (dc, dr))| (Position::at(sc, sr), MoveTo::new(Position::at(dc, dr)))),
        );

        let mut solution = [TileState::new(Tile::Red); POSITION_COUNT];
        for row in 1..=BOARD_HEIGHT {
            for (c, tile) in [Tile::Red, Tile::Green, Tile::Blue].into_iter().enumerate() {
                solution[Position::at(c + 1, row).index()] = TileState::new(tile);
            }
        }

        Self::from_forward_moves(
            [
                (Move::Up1, column(1)),
                (Move::Up2, column(2)),
                (Move::Up3, column(3)),
                (Move::Left, ring),
            ],
            State::from_tiles(solution),
        )
    }

    pub fn transform(&self, mv: Move) -> &Transform {
        &self.transforms[mv.index()]
    }

    pub fn solution(&self) -> &State {
        &self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_numbering() {
        assert_eq!(Position::at(1, 1), Position::FIRST);
        assert_eq!(Position::at(3, 5), Position::LAST);
        assert_eq!(Position::at(2, 1).index(), 1);
        assert_eq!(Position::at(1, 2).index(), 3);
        assert_eq!(Position::all().count(), POSITION_COUNT);
    }

    #[test]
    #[should_panic(expected = "position out of range")]
    fn test_position_zero_column_panics() {
        Position::at(0, 1);
    }

    #[test]
    #[should_panic(expected = "position out of range")]
    fn test_position_past_top_row_panics() {
        Position::at(1, BOARD_HEIGHT + 1);
    }

    #[test]
    fn test_rotation_is_modular() {
        assert_eq!(Rotation::new(5), Rotation::new(1));
        assert_eq!(Rotation::new(-1).quarter_turns(), 3);
        assert_eq!(Rotation::new(3).turned(RotationDelta(2)).quarter_turns(), 1);
        assert_eq!(Rotation::ZERO.turned(RotationDelta(-1)).quarter_turns(), 3);
        assert_eq!(RotationDelta(1).inverse(), RotationDelta(3));
        assert_eq!(RotationDelta(0).inverse(), RotationDelta(0));
    }

    #[test]
    fn test_move_inverse_is_involution() {
        for mv in Move::ALL {
            assert_ne!(mv, mv.inverse());
            assert_eq!(mv.inverse().inverse(), mv);
            assert_eq!(Move::ALL[mv.index()], mv);
        }
    }

    #[test]
    fn test_invert_swaps_source_and_destination() {
        let a = Position::at(1, 1);
        let b = Position::at(2, 3);
        let transform = Transform::from_pairs([(
            a,
            MoveTo {
                position: b,
                rotation: RotationDelta(1),
            },
        )]);

        let inverted = invert(&transform);
        assert_eq!(inverted.target(a), None);
        assert_eq!(
            inverted.target(b),
            Some(MoveTo {
                position: a,
                rotation: RotationDelta(3),
            })
        );
        assert_eq!(invert(&inverted), transform);
    }

    #[test]
    fn test_reference_board_moves_are_permutations() {
        let geometry = Geometry::simple_3x5();
        for mv in Move::ALL {
            let transform = geometry.transform(mv);
            assert!(!transform.is_identity(), "{mv} does nothing");
            let mut sources: Vec<_> = transform.entries().map(|(s, _)| s).collect();
            let mut targets: Vec<_> = transform.entries().map(|(_, t)| t.position).collect();
            sources.sort();
            targets.sort();
            assert_eq!(sources, targets, "{mv} is not a permutation of its cells");
        }
        // The centre cell is never touched by the ring.
        assert_eq!(geometry.transform(Move::Left).target(Position::at(2, 3)), None);
    }
}
