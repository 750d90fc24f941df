use std::fmt;
use std::io::{self, Write};

use crate::solver::{SearchReport, SolveResult};

impl fmt::Display for SearchReport {
    /// Three lines: algorithm name, statistics, then the path or the reason
    /// there is none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps = self.solution().map_or(0, |solution| solution.len());
        writeln!(f, "{}", self.algorithm.display_name())?;
        writeln!(
            f,
            "Steps: {}, Weight: ?, Node: {}, Time (ms): {:.3}, Memory (MB): {:.6}",
            steps,
            self.stats.nodes_expanded,
            self.stats.elapsed_ms(),
            self.stats.memory_mb()
        )?;
        match &self.result {
            SolveResult::Solved(solution) => writeln!(f, "{}", solution.path()),
            SolveResult::Exhausted => writeln!(f, "No solution found"),
            SolveResult::Cutoff(reason) => writeln!(f, "Search cut off ({})", reason),
        }
    }
}

/// Write one report per run, in order.
pub fn write_reports<W: Write>(out: &mut W, reports: &[SearchReport]) -> io::Result<()> {
    for report in reports {
        write!(out, "{}", report)?;
    }
    out.flush()
}
