use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::board::{Board, Cell, Position};
use crate::game::{Action, PuzzleState};

/// Error type for loading puzzles and replaying solutions.
#[derive(Debug, Error)]
pub enum PuzzleError {
    /// The input file does not exist
    #[error("input file {} not found", .path.display())]
    NotFound { path: PathBuf },
    /// Any other IO error when reading the input
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("empty input")]
    EmptyInput,
    #[error("invalid character '{ch}' at row {row}, column {col}")]
    InvalidCharacter { ch: char, row: usize, col: usize },
    #[error("invalid stone weight '{0}'")]
    InvalidWeight(String),
    #[error("insufficient weight data: {stones} stones but only {weights} weights")]
    InsufficientWeights { stones: usize, weights: usize },
    #[error("no agent found on board")]
    MissingAgent,
    #[error("second agent found at row {row}, column {col}")]
    MultipleAgents { row: usize, col: usize },
    #[error("illegal action '{code}' at step {step}")]
    IllegalAction { step: usize, code: char },
}

/// A loaded puzzle: the static board and the initial dynamic state.
#[derive(Debug, Clone)]
pub struct Puzzle {
    board: Board,
    initial: PuzzleState,
}

impl Puzzle {
    /// Parse a puzzle from text.
    ///
    /// The first line holds whitespace-separated positive stone weights.
    /// They are handed out from the end of the line: the first stone met in
    /// row-major order gets the last weight. Remaining lines are the grid:
    /// - `#` = Wall
    /// - ` ` = Floor
    /// - `.` = Switch
    /// - `$` = Stone
    /// - `*` = Stone on switch
    /// - `@` = Agent
    /// - `+` = Agent on switch
    ///
    /// Short lines are padded with blanks to the longest line.
    pub fn from_text(contents: &str) -> Result<Self, PuzzleError> {
        let mut lines = contents.lines();
        let weight_line = lines.next().ok_or(PuzzleError::EmptyInput)?;
        let mut weights = parse_weights(weight_line)?;

        let mut rows: Vec<&str> = lines.collect();
        while rows.last().is_some_and(|line| line.trim().is_empty()) {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(PuzzleError::EmptyInput);
        }

        let width = rows.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let grid: Vec<Vec<char>> = rows
            .iter()
            .map(|line| {
                let mut row: Vec<char> = line.chars().collect();
                row.resize(width, ' ');
                row
            })
            .collect();

        let stone_total = grid
            .iter()
            .flatten()
            .filter(|&&ch| ch == '$' || ch == '*')
            .count();
        let weight_total = weights.len();

        let mut agent = None;
        let mut stones = BTreeMap::new();
        let mut switches = BTreeMap::new();

        for (row, line) in grid.iter().enumerate() {
            for (col, &ch) in line.iter().enumerate() {
                let pos = Position::new(row, col);
                let mut take_weight = || {
                    weights.pop().ok_or(PuzzleError::InsufficientWeights {
                        stones: stone_total,
                        weights: weight_total,
                    })
                };
                match ch {
                    '#' | ' ' => {}
                    '.' => {
                        switches.insert(pos, false);
                    }
                    '$' => {
                        stones.insert(pos, take_weight()?);
                    }
                    '*' => {
                        stones.insert(pos, take_weight()?);
                        switches.insert(pos, true);
                    }
                    '@' | '+' => {
                        if agent.is_some() {
                            return Err(PuzzleError::MultipleAgents { row, col });
                        }
                        agent = Some(pos);
                        if ch == '+' {
                            switches.insert(pos, false);
                        }
                    }
                    _ => return Err(PuzzleError::InvalidCharacter { ch, row, col }),
                }
            }
        }

        let agent = agent.ok_or(PuzzleError::MissingAgent)?;
        let board = Board::from_grid(&grid);
        debug!(
            "parsed {}x{} board: {} stones, {} switches, agent at {}",
            board.rows(),
            board.cols(),
            stones.len(),
            switches.len(),
            agent
        );

        Ok(Puzzle {
            board,
            initial: PuzzleState::new(agent, stones, switches),
        })
    }

    /// Read and parse a puzzle file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PuzzleError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PuzzleError::NotFound {
                path: path.to_path_buf(),
            },
            _ => PuzzleError::Io(err),
        })?;
        Self::from_text(&contents)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn initial_state(&self) -> &PuzzleState {
        &self.initial
    }
}

fn parse_weights(line: &str) -> Result<Vec<u32>, PuzzleError> {
    line.split_whitespace()
        .map(|token| match token.parse::<u32>() {
            Ok(weight) if weight > 0 => Ok(weight),
            _ => Err(PuzzleError::InvalidWeight(token.to_string())),
        })
        .collect()
}

/// Apply a path of action codes step by step.
/// Returns every state along the way, the initial one included.
pub fn replay(
    board: &Board,
    initial: &PuzzleState,
    path: &str,
) -> Result<Vec<PuzzleState>, PuzzleError> {
    let mut states = Vec::with_capacity(path.len() + 1);
    states.push(initial.clone());
    for (step, code) in path.chars().enumerate() {
        let illegal = || PuzzleError::IllegalAction { step, code };
        let action = Action::from_code(code).ok_or_else(illegal)?;
        let current = &states[states.len() - 1];
        let next = current.apply_action(board, action).ok_or_else(illegal)?;
        states.push(next);
    }
    Ok(states)
}

/// Text rendering of a state on its board.
pub struct StateView<'a> {
    pub board: &'a Board,
    pub state: &'a PuzzleState,
}

impl fmt::Display for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.board.rows() {
            let mut line = String::with_capacity(self.board.cols());
            for col in 0..self.board.cols() {
                let pos = Position::new(row, col);
                let on_switch = self.state.switch_state(pos).is_some();

                let ch = if pos == self.state.agent() {
                    if on_switch { '+' } else { '@' }
                } else if self.state.has_stone(pos) {
                    if on_switch { '*' } else { '$' }
                } else if on_switch {
                    '.'
                } else {
                    match self.board.cell(pos) {
                        Cell::Wall => '#',
                        Cell::Floor | Cell::Unknown => ' ',
                    }
                };
                line.push(ch);
            }
            // Trim trailing spaces to match the input format
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_text_basic() {
        let puzzle = Puzzle::from_text("3\n#####\n#@$.#\n#   #\n#####").unwrap();
        let state = puzzle.initial_state();

        assert_eq!(puzzle.board().rows(), 4);
        assert_eq!(puzzle.board().cols(), 5);
        assert_eq!(state.agent(), Position::new(1, 1));
        assert_eq!(state.stone_weight(Position::new(1, 2)), Some(3));
        assert_eq!(state.switch_state(Position::new(1, 3)), Some(false));
        assert_eq!(puzzle.board().cell(Position::new(1, 2)), Cell::Floor);
    }

    #[test]
    fn test_weights_assigned_from_end_of_line() {
        let puzzle = Puzzle::from_text("5 7\n######\n#@$ .#\n# $ .#\n######").unwrap();
        let state = puzzle.initial_state();
        assert_eq!(state.stone_weight(Position::new(1, 2)), Some(7));
        assert_eq!(state.stone_weight(Position::new(2, 2)), Some(5));
    }

    #[test]
    fn test_extra_weights_are_ignored() {
        let puzzle = Puzzle::from_text("1 2 9\n#####\n#@$.#\n#####").unwrap();
        assert_eq!(
            puzzle.initial_state().stone_weight(Position::new(1, 2)),
            Some(9)
        );
    }

    #[test]
    fn test_insufficient_weights() {
        let result = Puzzle::from_text("4\n######\n#@$$.#\n#   .#\n######");
        assert!(matches!(
            result.unwrap_err(),
            PuzzleError::InsufficientWeights {
                stones: 2,
                weights: 1
            }
        ));
    }

    #[test]
    fn test_invalid_weight() {
        assert!(matches!(
            Puzzle::from_text("a\n####\n#@$.#\n####").unwrap_err(),
            PuzzleError::InvalidWeight(token) if token == "a"
        ));
        assert!(matches!(
            Puzzle::from_text("0\n####\n#@$.#\n####").unwrap_err(),
            PuzzleError::InvalidWeight(_)
        ));
    }

    #[test]
    fn test_invalid_character() {
        let err = Puzzle::from_text("\n####\n#@x#\n####").unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::InvalidCharacter {
                ch: 'x',
                row: 1,
                col: 2
            }
        ));
        assert_eq!(err.to_string(), "invalid character 'x' at row 1, column 2");
    }

    #[test]
    fn test_missing_and_multiple_agents() {
        assert!(matches!(
            Puzzle::from_text("\n####\n#  #\n####").unwrap_err(),
            PuzzleError::MissingAgent
        ));
        assert!(matches!(
            Puzzle::from_text("\n####\n#@@#\n####").unwrap_err(),
            PuzzleError::MultipleAgents { row: 1, col: 2 }
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            Puzzle::from_text("").unwrap_err(),
            PuzzleError::EmptyInput
        ));
        assert!(matches!(
            Puzzle::from_text("1 2\n\n").unwrap_err(),
            PuzzleError::EmptyInput
        ));
    }

    #[test]
    fn test_agent_on_switch() {
        let puzzle = Puzzle::from_text("1\n#####\n#+$ #\n#  .#\n#####").unwrap();
        let state = puzzle.initial_state();
        assert_eq!(state.agent(), Position::new(1, 1));
        assert_eq!(state.switch_state(Position::new(1, 1)), Some(false));
        assert_eq!(state.switches().len(), 2);
    }

    #[test]
    fn test_ragged_lines_are_padded() {
        let puzzle = Puzzle::from_text("\n####\n#@ #\n#  ###\n#    #\n######").unwrap();
        assert_eq!(puzzle.board().cols(), 6);
        assert_eq!(puzzle.board().cell(Position::new(0, 5)), Cell::Unknown);
        assert_eq!(puzzle.board().cell(Position::new(3, 4)), Cell::Floor);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "2\n#####\n#@$.#\n#####\n").unwrap();
        let puzzle = Puzzle::from_file(file.path()).unwrap();
        assert_eq!(
            puzzle.initial_state().stone_weight(Position::new(1, 2)),
            Some(2)
        );
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Puzzle::from_file("nonexistent_puzzle.txt");
        assert!(matches!(result.unwrap_err(), PuzzleError::NotFound { .. }));
    }

    #[test]
    fn test_replay() {
        let puzzle = Puzzle::from_text("1\n######\n#@ $.#\n######").unwrap();
        let states = replay(puzzle.board(), puzzle.initial_state(), "rR").unwrap();
        assert_eq!(states.len(), 3);
        assert!(states[2].is_finished());

        let err = replay(puzzle.board(), puzzle.initial_state(), "rl?").unwrap_err();
        assert!(matches!(err, PuzzleError::IllegalAction { step: 2, code: '?' }));

        let err = replay(puzzle.board(), puzzle.initial_state(), "R").unwrap_err();
        assert!(matches!(err, PuzzleError::IllegalAction { step: 0, code: 'R' }));
    }

    #[test]
    fn test_state_view() {
        let input = "  ####\n###  #\n#+ $.#\n# *  #\n######";
        let puzzle = Puzzle::from_text(&format!("1 1\n{}", input)).unwrap();
        let view = StateView {
            board: puzzle.board(),
            state: puzzle.initial_state(),
        };
        assert_eq!(view.to_string().trim_end(), input);
    }
}
