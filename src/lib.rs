//! Solver for a weighted stone-pushing puzzle.
//!
//! An agent walks a grid and pushes weighted stones onto switches; the puzzle
//! is solved once every switch is covered. A puzzle is loaded with
//! [`Puzzle::from_text`] or [`Puzzle::from_file`] and searched with a
//! [`Solver`] using one of four [`Algorithm`]s.

pub mod board;
pub mod game;
pub mod heuristic;
pub mod pqueue;
pub mod puzzle;
pub mod report;
pub mod solver;
pub mod zobrist;

pub use board::{Board, Cell, Position};
pub use game::{Action, Direction, Move, PuzzleState, legal_moves};
pub use heuristic::{Heuristic, NullHeuristic, SwitchCostHeuristic};
pub use puzzle::{Puzzle, PuzzleError, StateView, replay};
pub use solver::{
    ALL_ALGORITHMS, Algorithm, CancelToken, CutoffReason, SearchLimits, SearchReport,
    SearchStats, Solution, SolveResult, Solver,
};
pub use zobrist::{StateKey, Zobrist};
