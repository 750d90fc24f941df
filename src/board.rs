use std::fmt;
use std::ops::Range;

use crate::game::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Parsed, but outside every wall-enclosed region. Never walkable.
    Unknown,
    Floor,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Step one cell in the given direction.
    /// Returns None when the step would leave the non-negative quadrant.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        Some(Position {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }

    pub fn manhattan(self, other: Position) -> u64 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u64
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Static geometry of a puzzle. Built once and shared read-only by every state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Classify a rectangular character grid.
    ///
    /// Only `#` is treated as a wall; every other character is a candidate
    /// floor cell. A candidate is Floor when it lies in a run of non-wall
    /// characters bounded by walls on its row, and some column of that run
    /// has a wall-bounded vertical run covering the row. Everything else is
    /// Unknown.
    pub fn from_grid(grid: &[Vec<char>]) -> Self {
        let rows = grid.len();
        let cols = grid.iter().map(|line| line.len()).max().unwrap_or(0);

        let is_wall = |row: usize, col: usize| grid[row].get(col) == Some(&'#');

        let mut cells = vec![Cell::Unknown; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                if is_wall(row, col) {
                    cells[row * cols + col] = Cell::Wall;
                }
            }
        }

        let row_runs: Vec<Vec<Range<usize>>> = (0..rows)
            .map(|row| {
                let walls: Vec<bool> = (0..cols).map(|col| is_wall(row, col)).collect();
                wall_bounded_runs(&walls)
            })
            .collect();
        let col_runs: Vec<Vec<Range<usize>>> = (0..cols)
            .map(|col| {
                let walls: Vec<bool> = (0..rows).map(|row| is_wall(row, col)).collect();
                wall_bounded_runs(&walls)
            })
            .collect();

        for (row, runs) in row_runs.iter().enumerate() {
            for run in runs {
                let enclosed = run
                    .clone()
                    .any(|col| col_runs[col].iter().any(|vertical| vertical.contains(&row)));
                if enclosed {
                    for col in run.clone() {
                        cells[row * cols + col] = Cell::Floor;
                    }
                }
            }
        }

        Board { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell kind at a position; anything off the grid is Unknown.
    pub fn cell(&self, pos: Position) -> Cell {
        if pos.row < self.rows && pos.col < self.cols {
            self.cells[pos.row * self.cols + pos.col]
        } else {
            Cell::Unknown
        }
    }

    pub fn is_floor(&self, pos: Position) -> bool {
        self.cell(pos) == Cell::Floor
    }

    /// Row-major index of an in-bounds position.
    pub fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let mut line = String::with_capacity(self.cols);
            for col in 0..self.cols {
                line.push(match self.cell(Position::new(row, col)) {
                    Cell::Wall => '#',
                    Cell::Floor => '_',
                    Cell::Unknown => ' ',
                });
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Maximal runs of non-wall entries immediately preceded and followed by a wall.
fn wall_bounded_runs(walls: &[bool]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &wall) in walls.iter().enumerate() {
        if !wall {
            continue;
        }
        if let Some(begin) = start.take() {
            runs.push(begin..i);
        }
        if i + 1 < walls.len() && !walls[i + 1] {
            start = Some(i + 1);
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Vec<Vec<char>> {
        let lines: Vec<&str> = text.lines().collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        lines
            .iter()
            .map(|l| {
                let mut row: Vec<char> = l.chars().collect();
                row.resize(width, ' ');
                row
            })
            .collect()
    }

    #[test]
    fn test_wall_bounded_runs() {
        let walls = [true, false, false, true, true, false, true, false];
        assert_eq!(wall_bounded_runs(&walls), vec![1..3, 5..6]);
        assert!(wall_bounded_runs(&[false, false, true]).is_empty());
        assert!(wall_bounded_runs(&[true, true, true]).is_empty());
    }

    #[test]
    fn test_simple_room() {
        let board = Board::from_grid(&grid("#####\n#@$.#\n#   #\n#####"));
        assert_eq!(board.rows(), 4);
        assert_eq!(board.cols(), 5);
        assert_eq!(board.cell(Position::new(0, 0)), Cell::Wall);
        for col in 1..4 {
            assert_eq!(board.cell(Position::new(1, col)), Cell::Floor);
            assert_eq!(board.cell(Position::new(2, col)), Cell::Floor);
        }
    }

    #[test]
    fn test_padding_outside_walls_is_unknown() {
        let board = Board::from_grid(&grid("  ####\n###  #\n#@ $.#\n######\n   "));
        assert_eq!(board.cell(Position::new(0, 0)), Cell::Unknown);
        assert_eq!(board.cell(Position::new(0, 1)), Cell::Unknown);
        assert_eq!(board.cell(Position::new(1, 3)), Cell::Floor);
        assert_eq!(board.cell(Position::new(2, 1)), Cell::Floor);
        assert_eq!(board.cell(Position::new(4, 2)), Cell::Unknown);
    }

    #[test]
    fn test_trailing_open_run_is_unknown() {
        // The run after the last wall on row 1 is never closed.
        let board = Board::from_grid(&grid("####\n#@ #  \n####"));
        assert_eq!(board.cell(Position::new(1, 1)), Cell::Floor);
        assert_eq!(board.cell(Position::new(1, 4)), Cell::Unknown);
        assert_eq!(board.cell(Position::new(1, 5)), Cell::Unknown);
    }

    #[test]
    fn test_row_run_without_vertical_bound_is_unknown() {
        // Row 1 is closed horizontally, but no column closes below it.
        let board = Board::from_grid(&grid("#####\n#   #"));
        assert_eq!(board.cell(Position::new(1, 2)), Cell::Unknown);
    }

    #[test]
    fn test_out_of_bounds_is_unknown() {
        let board = Board::from_grid(&grid("###\n# #\n###"));
        assert_eq!(board.cell(Position::new(1, 1)), Cell::Floor);
        assert_eq!(board.cell(Position::new(3, 1)), Cell::Unknown);
        assert_eq!(board.cell(Position::new(1, 9)), Cell::Unknown);
    }

    #[test]
    fn test_position_step_and_distance() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Right), Some(Position::new(0, 1)));
        assert_eq!(origin.step(Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(Position::new(3, 1).manhattan(Position::new(1, 4)), 5);
    }

    #[test]
    fn test_display() {
        let board = Board::from_grid(&grid("####\n#  #\n####"));
        assert_eq!(board.to_string(), "####\n#__#\n####\n");
    }
}
