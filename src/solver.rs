use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fxhash::FxHashSet;
use log::{debug, info, trace};

use crate::board::Board;
use crate::game::{self, Action, PuzzleState};
use crate::heuristic::Heuristic;
use crate::pqueue::PriorityQueue;
use crate::zobrist::Zobrist;

const PROGRESS_INTERVAL: usize = 100_000;

/// Frontier exploration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    DepthFirst,
    BreadthFirst,
    UniformCost,
    /// Weighted best-first, guided by a possibly inadmissible heuristic.
    AStar,
}

pub const ALL_ALGORITHMS: [Algorithm; 4] = [
    Algorithm::DepthFirst,
    Algorithm::BreadthFirst,
    Algorithm::UniformCost,
    Algorithm::AStar,
];

impl Algorithm {
    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::DepthFirst => "Depth First Search",
            Algorithm::BreadthFirst => "Breadth First Search",
            Algorithm::UniformCost => "Uniform Cost Search",
            Algorithm::AStar => "A Star Search",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Shared flag that stops a running search at its next iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Operational limits, checked once per loop iteration. Unbounded by default.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub max_nodes: Option<usize>,
    pub time_limit: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffReason {
    NodeLimit,
    TimeLimit,
    Cancelled,
}

impl fmt::Display for CutoffReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutoffReason::NodeLimit => write!(f, "node limit reached"),
            CutoffReason::TimeLimit => write!(f, "time limit reached"),
            CutoffReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A solved action path: lowercase codes are steps, uppercase are pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    path: String,
}

impl Solution {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.path.chars().filter_map(Action::from_code)
    }

    pub fn pushes(&self) -> usize {
        self.actions().filter(|action| action.push).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Solution),
    /// The frontier emptied without reaching a finished state.
    Exhausted,
    Cutoff(CutoffReason),
}

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub nodes_expanded: usize,
    pub nodes_generated: usize,
    pub peak_frontier: usize,
    pub elapsed: Duration,
    /// Running sum of the estimated size of every successor built, duplicates included.
    pub approx_memory_bytes: usize,
}

impl SearchStats {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn memory_mb(&self) -> f64 {
        self.approx_memory_bytes as f64 / 1_000_000.0
    }
}

/// Result record of one run.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub algorithm: Algorithm,
    pub result: SolveResult,
    pub stats: SearchStats,
}

impl SearchReport {
    pub fn solution(&self) -> Option<&Solution> {
        match &self.result {
            SolveResult::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Arena record used to rebuild the action path of a frontier entry.
struct PathNode {
    parent: Option<usize>,
    action: char,
}

struct Entry {
    state: PuzzleState,
    node: usize,
    cost: u64,
}

enum Frontier {
    Stack(Vec<Entry>),
    Queue(VecDeque<Entry>),
    Priority(PriorityQueue<Entry>),
}

impl Frontier {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::DepthFirst => Frontier::Stack(Vec::new()),
            Algorithm::BreadthFirst => Frontier::Queue(VecDeque::new()),
            Algorithm::UniformCost | Algorithm::AStar => Frontier::Priority(PriorityQueue::new()),
        }
    }

    fn push(&mut self, entry: Entry) {
        match self {
            Frontier::Stack(stack) => stack.push(entry),
            Frontier::Queue(queue) => queue.push_back(entry),
            Frontier::Priority(pq) => pq.push(entry.cost, entry),
        }
    }

    fn pop(&mut self) -> Option<Entry> {
        match self {
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Priority(pq) => pq.pop_min(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Stack(stack) => stack.len(),
            Frontier::Queue(queue) => queue.len(),
            Frontier::Priority(pq) => pq.len(),
        }
    }
}

/// Search engine over one board.
///
/// The board is borrowed read-only, so several solvers may share it; each
/// `solve` call owns its own frontier, visited set and statistics.
pub struct Solver<'a, H> {
    board: &'a Board,
    heuristic: H,
    zobrist: Zobrist,
    limits: SearchLimits,
}

impl<'a, H: Heuristic> Solver<'a, H> {
    pub fn new(board: &'a Board, heuristic: H, limits: SearchLimits) -> Self {
        Solver {
            board,
            heuristic,
            zobrist: Zobrist::new(board),
            limits,
        }
    }

    /// Run one strategy from the given initial state to completion.
    pub fn solve(&self, algorithm: Algorithm, initial: &PuzzleState) -> SearchReport {
        debug!("{} started", algorithm);
        let start = Instant::now();
        let mut stats = SearchStats::default();

        let mut visited = FxHashSet::default();
        visited.insert(self.zobrist.key(initial));

        let mut nodes = vec![PathNode {
            parent: None,
            action: ' ',
        }];
        let mut frontier = Frontier::new(algorithm);
        frontier.push(Entry {
            state: initial.clone(),
            node: 0,
            cost: 0,
        });
        stats.peak_frontier = 1;

        let result = loop {
            if let Some(reason) = self.check_limits(&stats, start) {
                break SolveResult::Cutoff(reason);
            }

            let Some(entry) = frontier.pop() else {
                break SolveResult::Exhausted;
            };
            stats.nodes_expanded += 1;

            if entry.state.is_finished() {
                break SolveResult::Solved(Solution {
                    path: rebuild_path(&nodes, entry.node),
                });
            }

            // Best-first ranks every child by its parent's estimate.
            let step_cost = match algorithm {
                Algorithm::AStar => self.heuristic.estimate(&entry.state),
                _ => 1,
            };

            for (mv, next) in game::successors(self.board, &entry.state) {
                stats.approx_memory_bytes += next.approx_bytes();
                if !visited.insert(self.zobrist.key(&next)) {
                    continue;
                }
                stats.nodes_generated += 1;

                nodes.push(PathNode {
                    parent: Some(entry.node),
                    action: mv.action.code(),
                });
                frontier.push(Entry {
                    state: next,
                    node: nodes.len() - 1,
                    cost: entry.cost + step_cost,
                });
            }
            stats.peak_frontier = stats.peak_frontier.max(frontier.len());

            if stats.nodes_expanded % PROGRESS_INTERVAL == 0 {
                debug!(
                    "{}: expanded={} visited={} frontier={}",
                    algorithm,
                    stats.nodes_expanded,
                    visited.len(),
                    frontier.len()
                );
            } else {
                trace!(
                    "{}: expanded node {} at cost {}",
                    algorithm, stats.nodes_expanded, entry.cost
                );
            }
        };

        stats.elapsed = start.elapsed();
        match &result {
            SolveResult::Solved(solution) => info!(
                "{} solved in {} steps after {} nodes ({:.2} ms)",
                algorithm,
                solution.len(),
                stats.nodes_expanded,
                stats.elapsed_ms()
            ),
            SolveResult::Exhausted => info!(
                "{} exhausted after {} nodes: no solution found",
                algorithm, stats.nodes_expanded
            ),
            SolveResult::Cutoff(reason) => info!(
                "{} cut off after {} nodes: {}",
                algorithm, stats.nodes_expanded, reason
            ),
        }

        SearchReport {
            algorithm,
            result,
            stats,
        }
    }

    fn check_limits(&self, stats: &SearchStats, start: Instant) -> Option<CutoffReason> {
        if self
            .limits
            .cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
        {
            return Some(CutoffReason::Cancelled);
        }
        if self
            .limits
            .time_limit
            .is_some_and(|limit| start.elapsed() >= limit)
        {
            return Some(CutoffReason::TimeLimit);
        }
        if self
            .limits
            .max_nodes
            .is_some_and(|max| stats.nodes_expanded >= max)
        {
            return Some(CutoffReason::NodeLimit);
        }
        None
    }
}

fn rebuild_path(nodes: &[PathNode], mut index: usize) -> String {
    let mut actions = Vec::new();
    while let Some(parent) = nodes[index].parent {
        actions.push(nodes[index].action);
        index = parent;
    }
    actions.iter().rev().collect()
}
