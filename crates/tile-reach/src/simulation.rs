//! Monte-Carlo random walks over the transition graph.

use fxhash::FxHashSet;
use log::debug;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geometry::{Move, MOVE_COUNT};
use crate::graph::{GraphId, TransitionGraph};

/// How one walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Reached the solution
    Solution,
    /// Stepped onto a state already visited by this walk
    Loop,
    /// Used every step without solving or looping
    Unfinished,
}

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Maximum moves per walk
    pub input_length: usize,
    /// Number of independent walks
    pub iterations: usize,
    /// Seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            input_length: 3,
            iterations: 1000,
            seed: None,
        }
    }
}

/// Aggregated walk outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub input_length: usize,
    pub iterations: usize,
    pub solutions: usize,
    pub loops: usize,
    pub unfinished: usize,
}

impl SimulationResult {
    fn record(&mut self, outcome: WalkOutcome) {
        match outcome {
            WalkOutcome::Solution => self.solutions += 1,
            WalkOutcome::Loop => self.loops += 1,
            WalkOutcome::Unfinished => self.unfinished += 1,
        }
    }
}

/// Walk at most `input_length` moves from `start`.
///
/// Each step picks a random offset into the move list and takes the first
/// move, cycling from there, that changes the state. If every move is a
/// no-op the walk stays put for that step.
pub fn random_walk<R: Rng + ?Sized>(
    graph: &TransitionGraph,
    start: GraphId,
    input_length: usize,
    rng: &mut R,
    seen: &mut FxHashSet<GraphId>,
) -> WalkOutcome {
    seen.clear();
    let mut current = start;

    for _ in 0..input_length {
        let offset = rng.gen_range(0..MOVE_COUNT);
        let next = (0..MOVE_COUNT)
            .map(|i| Move::ALL[(i + offset) % MOVE_COUNT])
            .filter_map(|mv| graph.step(current, mv))
            .find(|&next| next != current);

        let Some(next) = next else {
            continue;
        };
        if graph.is_solution(next) {
            return WalkOutcome::Solution;
        }
        if !seen.insert(next) {
            return WalkOutcome::Loop;
        }
        current = next;
    }

    WalkOutcome::Unfinished
}

/// Run `config.iterations` independent walks from `start` and count how
/// each one ended.
pub fn simulate_inputs(
    graph: &TransitionGraph,
    start: GraphId,
    config: &SimulationConfig,
) -> SimulationResult {
    let mut rng: Box<dyn RngCore> = match config.seed {
        Some(s) => Box::new(rand::rngs::StdRng::seed_from_u64(s)),
        None => Box::new(rand::rngs::StdRng::from_entropy()),
    };

    let mut result = SimulationResult {
        input_length: config.input_length,
        iterations: config.iterations,
        ..Default::default()
    };
    let mut seen = FxHashSet::default();

    for _ in 0..config.iterations {
        let outcome = random_walk(graph, start, config.input_length, &mut rng, &mut seen);
        result.record(outcome);
    }

    debug!(
        "length {}: {} solutions, {} loops, {} unfinished",
        result.input_length, result.solutions, result.loops, result.unfinished
    );
    result
}
