//! Exhaustive enumeration of distinct move sequences.
//!
//! The exact counterpart of the random walks: every sequence of at most
//! `max_length` state-changing moves is classified, not sampled.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Move;
use crate::graph::{GraphId, TransitionGraph};

/// A sequence of moves, stored inline for the short lengths enumerated
pub type InputSequence = SmallVec<[Move; 16]>;

/// Sequences grouped by how they end
#[derive(Debug, Clone, Default)]
pub struct SequenceClasses {
    /// Ending on the solution
    pub solutions: Vec<InputSequence>,
    /// Ending on a state visited earlier in the same sequence
    pub loops: Vec<InputSequence>,
    /// Reaching the length bound without doing either
    pub unfinished: Vec<InputSequence>,
}

impl SequenceClasses {
    pub fn counts(&self, input_length: usize) -> SequenceCounts {
        SequenceCounts {
            input_length,
            solutions: self.solutions.len(),
            loops: self.loops.len(),
            unfinished: self.unfinished.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceCounts {
    pub input_length: usize,
    pub solutions: usize,
    pub loops: usize,
    pub unfinished: usize,
}

struct Candidate {
    inputs: InputSequence,
    // States visited, starting state first
    path: SmallVec<[GraphId; 17]>,
}

/// Enumerate every sequence from `start` up to `max_length` moves.
///
/// Moves that leave the state unchanged are never taken. A sequence stops
/// growing as soon as it reaches the solution or revisits one of its own
/// earlier states.
pub fn unique_input_sequences(
    graph: &TransitionGraph,
    start: GraphId,
    max_length: usize,
) -> SequenceClasses {
    let mut classes = SequenceClasses::default();
    let mut working = vec![Candidate {
        inputs: SmallVec::new(),
        path: SmallVec::from_elem(start, 1),
    }];
    let mut waiting = Vec::new();

    while !working.is_empty() {
        for candidate in working.drain(..) {
            if candidate.inputs.len() == max_length {
                classes.unfinished.push(candidate.inputs);
                continue;
            }
            let Some(&current) = candidate.path.last() else {
                continue;
            };

            for mv in Move::ALL {
                let Some(next) = graph.step(current, mv) else {
                    continue;
                };
                if next == current {
                    continue;
                }

                let mut inputs = candidate.inputs.clone();
                inputs.push(mv);
                if graph.is_solution(next) {
                    classes.solutions.push(inputs);
                } else if candidate.path.contains(&next) {
                    classes.loops.push(inputs);
                } else {
                    let mut path = candidate.path.clone();
                    path.push(next);
                    waiting.push(Candidate { inputs, path });
                }
            }
        }
        std::mem::swap(&mut working, &mut waiting);
    }

    classes
}

struct Tally {
    // Indexed by sequence length
    solutions: Vec<usize>,
    loops: Vec<usize>,
    open: Vec<usize>,
}

/// Counts for every length bound from 0 to `max_length`, in one
/// depth-first pass that keeps only the current path.
///
/// Entry `n` equals `unique_input_sequences(graph, start, n).counts(n)`:
/// solutions and loops ending at any length up to `n`, plus the sequences
/// still open at exactly `n` moves.
pub fn count_input_sequences(
    graph: &TransitionGraph,
    start: GraphId,
    max_length: usize,
) -> Vec<SequenceCounts> {
    let mut tally = Tally {
        solutions: vec![0; max_length + 1],
        loops: vec![0; max_length + 1],
        open: vec![0; max_length + 1],
    };
    let mut path = vec![start];
    count_from(graph, &mut path, max_length, &mut tally);

    let mut solutions = 0;
    let mut loops = 0;
    (0..=max_length)
        .map(|input_length| {
            solutions += tally.solutions[input_length];
            loops += tally.loops[input_length];
            SequenceCounts {
                input_length,
                solutions,
                loops,
                unfinished: tally.open[input_length],
            }
        })
        .collect()
}

fn count_from(graph: &TransitionGraph, path: &mut Vec<GraphId>, max_length: usize, tally: &mut Tally) {
    let length = path.len() - 1;
    tally.open[length] += 1;
    if length == max_length {
        return;
    }
    let current = path[length];

    for mv in Move::ALL {
        let Some(next) = graph.step(current, mv) else {
            continue;
        };
        if next == current {
            continue;
        }

        if graph.is_solution(next) {
            tally.solutions[length + 1] += 1;
        } else if path.contains(&next) {
            tally.loops[length + 1] += 1;
        } else {
            path.push(next);
            count_from(graph, path, max_length, tally);
            path.pop();
        }
    }
}
