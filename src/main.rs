use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use log::error;
use stonepush::report::write_reports;
use stonepush::{
    ALL_ALGORITHMS, Algorithm, Heuristic, NullHeuristic, Puzzle, SearchLimits, SearchReport,
    Solver, StateView, SwitchCostHeuristic, replay,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmType {
    Dfs,
    Bfs,
    Ucs,
    Astar,
}

impl From<AlgorithmType> for Algorithm {
    fn from(algorithm: AlgorithmType) -> Self {
        match algorithm {
            AlgorithmType::Dfs => Algorithm::DepthFirst,
            AlgorithmType::Bfs => Algorithm::BreadthFirst,
            AlgorithmType::Ucs => Algorithm::UniformCost,
            AlgorithmType::Astar => Algorithm::AStar,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicType {
    SwitchCost,
    Null,
}

#[derive(Parser)]
#[command(name = "stonepush")]
#[command(about = "A weighted stone-pushing puzzle solver", long_about = None)]
struct Args {
    /// Path to the puzzle file (weights line followed by the grid)
    #[arg(value_name = "FILE")]
    puzzle_file: String,

    /// Search algorithm to run (repeatable)
    #[arg(short, long, value_enum, default_value = "astar")]
    algorithm: Vec<AlgorithmType>,

    /// Run all four algorithms in turn
    #[arg(long, default_value = "false")]
    all: bool,

    /// Heuristic used by A* search
    #[arg(short = 'H', long, value_enum, default_value = "switch-cost")]
    heuristic: HeuristicType,

    /// Maximum number of nodes to expand before giving up
    #[arg(short = 'n', long)]
    max_nodes: Option<usize>,

    /// Give up after this many milliseconds
    #[arg(short = 't', long)]
    timeout_ms: Option<u64>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn print_solution(puzzle: &Puzzle, report: &SearchReport) {
    let Some(solution) = report.solution() else {
        return;
    };
    let states = match replay(puzzle.board(), puzzle.initial_state(), solution.path()) {
        Ok(states) => states,
        Err(e) => {
            error!("Solution does not replay: {}", e);
            return;
        }
    };

    let board = puzzle.board();
    println!(
        "\n{} - starting position:\n{}",
        report.algorithm,
        StateView {
            board,
            state: &states[0]
        }
    );
    let total = solution.len();
    for (count, (action, state)) in solution.actions().zip(&states[1..]).enumerate() {
        println!(
            "{} {} ({}/{}):\n{}",
            if action.push { "Push" } else { "Move" },
            action.direction,
            count + 1,
            total,
            StateView { board, state }
        );
    }
}

fn run_all<H: Heuristic>(
    puzzle: &Puzzle,
    algorithms: &[Algorithm],
    heuristic: H,
    limits: SearchLimits,
) -> Vec<SearchReport> {
    let solver = Solver::new(puzzle.board(), heuristic, limits);
    algorithms
        .iter()
        .map(|&algorithm| solver.solve(algorithm, puzzle.initial_state()))
        .collect()
}

fn main() {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let puzzle = match Puzzle::from_file(&args.puzzle_file) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("Error loading puzzle: {}", e);
            process::exit(1);
        }
    };

    let algorithms: Vec<Algorithm> = if args.all {
        ALL_ALGORITHMS.to_vec()
    } else {
        args.algorithm.iter().map(|&a| a.into()).collect()
    };

    let limits = SearchLimits {
        max_nodes: args.max_nodes,
        time_limit: args.timeout_ms.map(Duration::from_millis),
        cancel: None,
    };

    let reports = match args.heuristic {
        HeuristicType::SwitchCost => {
            run_all(&puzzle, &algorithms, SwitchCostHeuristic::new(), limits)
        }
        HeuristicType::Null => run_all(&puzzle, &algorithms, NullHeuristic::new(), limits),
    };

    let written = match &args.output {
        Some(path) => File::create(path)
            .and_then(|file| write_reports(&mut BufWriter::new(file), &reports)),
        None => write_reports(&mut io::stdout().lock(), &reports),
    };
    if let Err(e) = written {
        eprintln!("Error writing report: {}", e);
        process::exit(1);
    }

    if args.print_solution {
        for report in &reports {
            print_solution(&puzzle, report);
        }
    }
}
