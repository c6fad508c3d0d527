//! Property-based tests for states, transforms and rotations.

use proptest::prelude::*;

use tile_reach::{
    Geometry, Move, MoveTo, Position, Rotation, RotationDelta, State, StateHasher, Tile, TileState,
    Transform,
};

/// Strategy: a move from the fixed move set.
fn move_strategy() -> impl Strategy<Value = Move> {
    prop::sample::select(Move::ALL.to_vec())
}

/// Strategy: a short sequence of moves.
fn moves_strategy() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec(move_strategy(), 0..24)
}

/// Reference board whose column moves also turn every tile they carry
fn turning_geometry() -> Geometry {
    let reference = Geometry::simple_3x5();
    let turning = |mv: Move| {
        Transform::from_pairs(reference.transform(mv).entries().map(|(source, target)| {
            (
                source,
                MoveTo {
                    position: target.position,
                    rotation: RotationDelta(1),
                },
            )
        }))
    };
    Geometry::from_forward_moves(
        [
            (Move::Up1, turning(Move::Up1)),
            (Move::Up2, turning(Move::Up2)),
            (Move::Up3, reference.transform(Move::Up3).clone()),
            (Move::Left, reference.transform(Move::Left).clone()),
        ],
        *reference.solution(),
    )
}

fn played(geometry: &Geometry, moves: &[Move]) -> State {
    moves
        .iter()
        .fold(*geometry.solution(), |state, &mv| state.apply(geometry, mv))
}

proptest! {
    // 1. Undoing a sequence in reverse restores every tile and rotation
    #[test]
    fn undo_restores_state(moves in moves_strategy()) {
        let geometry = turning_geometry();
        let there = played(&geometry, &moves);
        let back = moves
            .iter()
            .rev()
            .fold(there, |state, &mv| state.apply(&geometry, mv.inverse()));

        for position in Position::all() {
            prop_assert_eq!(back.get(position), geometry.solution().get(position));
        }
    }

    // 2. Moves permute tiles: the colour census never changes
    #[test]
    fn moves_preserve_tile_counts(moves in moves_strategy()) {
        let geometry = Geometry::simple_3x5();
        let state = played(&geometry, &moves);
        for tile in [Tile::Red, Tile::Green, Tile::Blue] {
            let count = Position::all().filter(|&p| state.get(p).tile == tile).count();
            prop_assert_eq!(count, 5);
        }
    }

    // 3. Hashing is deterministic and blind to rotation
    #[test]
    fn hash_ignores_rotation(moves in moves_strategy()) {
        let hasher = StateHasher::new();
        let turned = played(&turning_geometry(), &moves);
        let plain = played(&Geometry::simple_3x5(), &moves);

        prop_assert_eq!(hasher.hash(&turned), hasher.hash(&turned));
        prop_assert_eq!(hasher.hash(&turned), hasher.hash(&plain));
        prop_assert_eq!(turned, plain);
    }

    // 4. Rotation arithmetic is modulo four
    #[test]
    fn rotation_wraps(start in 0..4i32, delta in -8..8i8) {
        let turned = Rotation::new(start).turned(RotationDelta(delta));
        prop_assert_eq!(turned, Rotation::new(start + delta as i32));
        prop_assert!(turned.quarter_turns() < 4);
        prop_assert_eq!(
            turned.turned(RotationDelta(delta).inverse()),
            Rotation::new(start)
        );
    }
}

#[test]
fn test_tile_state_defaults_to_zero_rotation() {
    let cell = TileState::new(Tile::Green);
    assert_eq!(cell.rotation, Rotation::ZERO);
}
