//! CLI entry point for tile-reach.
//!
//! Usage:
//!   tile-reach explore [--max-depth <n>] [--json]
//!   tile-reach show [--depth <d>]
//!   tile-reach simulate [--depth <d>] [--min-length <a>] [--max-length <b>] [options]
//!   tile-reach sequences [--depth <d>] [--max-length <b>] [--json]
//!
//! Every command explores the reference 3x5 board first. Set `RUST_LOG`
//! to change log verbosity (default: info).

use clap::{Parser, Subcommand};
use log::info;
use serde::{Deserialize, Serialize};

use tile_reach::{
    count_input_sequences, simulate_inputs, Board, ExploreConfig, ExploreSummary, Geometry, GraphId,
    Move, NodeId, Result, SequenceCounts, SimulationConfig, SimulationResult, StateHasher,
    TransitionGraph,
};

#[derive(Parser)]
#[command(name = "tile-reach")]
#[command(about = "Reachability and random-walk statistics for the 3x5 tile puzzle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count reachable states and minimal sequences at each depth
    Explore {
        /// Stop after this many layers (default: run to closure)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the boards along one minimal sequence to a state at the given depth
    Show {
        /// Depth of the example state
        #[arg(long, default_value = "8")]
        depth: usize,
    },

    /// Run random walks from an example state for a range of walk lengths
    Simulate {
        /// Depth of the starting state
        #[arg(long, default_value = "8")]
        depth: usize,

        /// Shortest walk length
        #[arg(long, default_value = "3")]
        min_length: usize,

        /// Longest walk length
        #[arg(long, default_value = "12")]
        max_length: usize,

        /// Walks per length
        #[arg(long, default_value = "1000000")]
        iterations: usize,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exhaustively classify every move sequence from an example state
    Sequences {
        /// Depth of the starting state
        #[arg(long, default_value = "8")]
        depth: usize,

        /// Longest sequence length
        #[arg(long, default_value = "8")]
        max_length: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExploreOutput {
    states: usize,
    tree_nodes: usize,
    deepest: usize,
    closed: bool,
    depths: Vec<DepthOutput>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepthOutput {
    depth: usize,
    states: usize,
    minimal_sequences: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalkOutput<T> {
    start_depth: usize,
    start_inputs: Vec<Move>,
    results: Vec<T>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Explore { max_depth, json } => {
            let (board, summary) = explored_board(max_depth)?;
            let output = format_exploration(&board, &summary);
            if json {
                print_json(&output);
            } else {
                println!("Number of board states: {}", output.states);
                for depth in &output.depths {
                    println!(
                        "At reachability depth {} there are {} unique states with {} minimal sequences",
                        depth.depth, depth.states, depth.minimal_sequences
                    );
                }
            }
        }

        Commands::Show { depth } => {
            let (board, _) = explored_board(None)?;
            let node = board.example_at_depth(depth)?;
            let inputs = board.tree().from_inputs(node);
            let states = board.states_reaching(node)?;
            for (i, state) in states.iter().enumerate() {
                println!("{}", state);
                if let Some(mv) = inputs.get(i) {
                    println!("-> {}", mv);
                }
            }
        }

        Commands::Simulate {
            depth,
            min_length,
            max_length,
            iterations,
            seed,
            json,
        } => {
            let (mut board, _) = explored_board(None)?;
            let graph = TransitionGraph::build(&mut board)?;
            let (node, start) = start_node(&board, &graph, depth)?;

            info!("simulating {} walks per length", iterations);
            let results: Vec<SimulationResult> = (min_length..=max_length)
                .map(|input_length| {
                    let config = SimulationConfig {
                        input_length,
                        iterations,
                        // Distinct stream per length
                        seed: seed.map(|s| s.wrapping_add(input_length as u64)),
                    };
                    let result = simulate_inputs(&graph, start, &config);
                    if !json {
                        println!(
                            "At input sequence length {}: {} solutions, {} looped sequences, {} unfinished sequences",
                            result.input_length, result.solutions, result.loops, result.unfinished
                        );
                    }
                    result
                })
                .collect();

            if json {
                print_json(&WalkOutput {
                    start_depth: depth,
                    start_inputs: board.tree().from_inputs(node),
                    results,
                });
            }
        }

        Commands::Sequences {
            depth,
            max_length,
            json,
        } => {
            let (mut board, _) = explored_board(None)?;
            let graph = TransitionGraph::build(&mut board)?;
            let (node, start) = start_node(&board, &graph, depth)?;

            let results: Vec<SequenceCounts> = count_input_sequences(&graph, start, max_length)
                .into_iter()
                .skip(1)
                .collect();
            if !json {
                for counts in &results {
                    println!(
                        "At input sequence length {}: {} solutions, {} loops, {} unfinished sequences",
                        counts.input_length, counts.solutions, counts.loops, counts.unfinished
                    );
                }
            }

            if json {
                print_json(&WalkOutput {
                    start_depth: depth,
                    start_inputs: board.tree().from_inputs(node),
                    results,
                });
            }
        }
    }
    Ok(())
}

fn explored_board(max_depth: Option<usize>) -> Result<(Board, ExploreSummary)> {
    let mut board = Board::new(Geometry::simple_3x5(), StateHasher::new());
    let summary = board.explore(&ExploreConfig { max_depth })?;
    Ok((board, summary))
}

fn start_node(board: &Board, graph: &TransitionGraph, depth: usize) -> Result<(NodeId, GraphId)> {
    let node = board.example_at_depth(depth)?;
    let start = graph.lookup(board.tree().node(node).state_hash)?;
    info!(
        "starting from depth {} via {:?}",
        depth,
        board.tree().from_inputs(node)
    );
    Ok((node, start))
}

fn format_exploration(board: &Board, summary: &ExploreSummary) -> ExploreOutput {
    let (trees, state_counts) = board.trees_by_input_len();
    ExploreOutput {
        states: board.state_count(),
        tree_nodes: board.tree().len(),
        deepest: summary.deepest,
        closed: summary.closed,
        depths: state_counts
            .iter()
            .map(|(&depth, &states)| DepthOutput {
                depth,
                states,
                minimal_sequences: trees.get(&depth).map_or(0, Vec::len),
            })
            .collect(),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error formatting output: {}", e),
    }
}
