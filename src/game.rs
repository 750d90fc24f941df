use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::board::{Board, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Expansion order. Fixed so that every strategy explores reproducibly.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    /// (row, column) offset.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Direction::Left => 'l',
            Direction::Right => 'r',
            Direction::Up => 'u',
            Direction::Down => 'd',
        }
    }

    fn from_letter(letter: char) -> Option<Direction> {
        match letter {
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

/// A single agent action: a plain step, or a step that pushes a stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub direction: Direction,
    pub push: bool,
}

impl Action {
    /// Lowercase letter for a step, uppercase for a push.
    pub fn code(&self) -> char {
        let letter = self.direction.letter();
        if self.push {
            letter.to_ascii_uppercase()
        } else {
            letter
        }
    }

    pub fn from_code(code: char) -> Option<Action> {
        let direction = Direction::from_letter(code.to_ascii_lowercase())?;
        Some(Action {
            direction,
            push: code.is_ascii_uppercase(),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A legal move as produced by [`legal_moves`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub agent_to: Position,
    pub action: Action,
    /// Destination of the pushed stone, if the move is a push.
    pub stone_to: Option<Position>,
}

/// Dynamic facts of a puzzle: where the agent and stones are, and which
/// switches are covered.
///
/// The stone and switch maps are shared between states and only copied when
/// a push changes them, so every state stays an independent value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    agent: Position,
    stones: Arc<BTreeMap<Position, u32>>,
    switches: Arc<BTreeMap<Position, bool>>,
}

impl PuzzleState {
    pub fn new(
        agent: Position,
        stones: BTreeMap<Position, u32>,
        switches: BTreeMap<Position, bool>,
    ) -> Self {
        PuzzleState {
            agent,
            stones: Arc::new(stones),
            switches: Arc::new(switches),
        }
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    /// Stone positions and their weights, in row-major order.
    pub fn stones(&self) -> &BTreeMap<Position, u32> {
        &self.stones
    }

    /// Switch positions and their covered flags, in row-major order.
    pub fn switches(&self) -> &BTreeMap<Position, bool> {
        &self.switches
    }

    pub fn stone_weight(&self, pos: Position) -> Option<u32> {
        self.stones.get(&pos).copied()
    }

    pub fn has_stone(&self, pos: Position) -> bool {
        self.stones.contains_key(&pos)
    }

    pub fn switch_state(&self, pos: Position) -> Option<bool> {
        self.switches.get(&pos).copied()
    }

    /// Every switch is covered. Vacuously true without switches.
    pub fn is_finished(&self) -> bool {
        self.switches.values().all(|&covered| covered)
    }

    /// Rough heap plus inline footprint of this state, for search statistics.
    pub fn approx_bytes(&self) -> usize {
        mem::size_of::<Self>()
            + self.stones.len() * mem::size_of::<(Position, u32)>()
            + self.switches.len() * mem::size_of::<(Position, bool)>()
    }

    /// Produce the successor reached by a move from [`legal_moves`].
    pub fn apply(&self, mv: &Move) -> PuzzleState {
        let mut next = self.clone();
        next.agent = mv.agent_to;

        if let Some(stone_to) = mv.stone_to {
            let stones = Arc::make_mut(&mut next.stones);
            if let Some(weight) = stones.remove(&mv.agent_to) {
                stones.insert(stone_to, weight);
            }

            let leaves_switch = next.switches.contains_key(&mv.agent_to);
            let enters_switch = next.switches.contains_key(&stone_to);
            if leaves_switch || enters_switch {
                let switches = Arc::make_mut(&mut next.switches);
                if let Some(covered) = switches.get_mut(&mv.agent_to) {
                    *covered = false;
                }
                if let Some(covered) = switches.get_mut(&stone_to) {
                    *covered = true;
                }
            }
        }

        next
    }

    /// Apply an action if it is legal from this state.
    pub fn apply_action(&self, board: &Board, action: Action) -> Option<PuzzleState> {
        legal_moves(board, self)
            .into_iter()
            .find(|mv| mv.action == action)
            .map(|mv| self.apply(&mv))
    }
}

/// Enumerate the legal moves of the agent in the fixed direction order.
///
/// A step into a Wall or Unknown cell is illegal. A step into a stone is a
/// push, legal only when the cell behind the stone is walkable and free of
/// other stones.
pub fn legal_moves(board: &Board, state: &PuzzleState) -> ArrayVec<Move, 4> {
    let mut moves = ArrayVec::new();

    for direction in ALL_DIRECTIONS {
        let Some(dest) = state.agent.step(direction) else {
            continue;
        };
        if !board.is_floor(dest) {
            continue;
        }

        if !state.has_stone(dest) {
            moves.push(Move {
                agent_to: dest,
                action: Action {
                    direction,
                    push: false,
                },
                stone_to: None,
            });
            continue;
        }

        let Some(stone_dest) = dest.step(direction) else {
            continue;
        };
        if !board.is_floor(stone_dest) || state.has_stone(stone_dest) {
            continue;
        }
        moves.push(Move {
            agent_to: dest,
            action: Action {
                direction,
                push: true,
            },
            stone_to: Some(stone_dest),
        });
    }

    moves
}

/// Legal moves paired with the states they lead to.
pub fn successors<'a>(
    board: &'a Board,
    state: &'a PuzzleState,
) -> impl Iterator<Item = (Move, PuzzleState)> + 'a {
    legal_moves(board, state)
        .into_iter()
        .map(move |mv| (mv, state.apply(&mv)))
}
