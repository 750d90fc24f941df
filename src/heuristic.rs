use crate::game::PuzzleState;

/// Trait for estimating the remaining cost from a state to a finished one.
///
/// Estimates only order the best-first frontier; they need not be lower bounds.
pub trait Heuristic {
    fn estimate(&self, state: &PuzzleState) -> u64;
}

pub struct NullHeuristic;

impl NullHeuristic {
    pub fn new() -> Self {
        NullHeuristic
    }
}

impl Default for NullHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for NullHeuristic {
    fn estimate(&self, _state: &PuzzleState) -> u64 {
        0
    }
}

/// Weighted push-distance estimate.
///
/// For every switch (covered or not), sums the weighted Manhattan push cost
/// of every stone to that switch, plus the cheapest approach-and-push over
/// single stones. Stones are counted once per switch, so the total
/// overestimates and best-first search guided by it is not optimal.
pub struct SwitchCostHeuristic;

impl SwitchCostHeuristic {
    pub fn new() -> Self {
        SwitchCostHeuristic
    }
}

impl Default for SwitchCostHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for SwitchCostHeuristic {
    fn estimate(&self, state: &PuzzleState) -> u64 {
        let agent = state.agent();
        let mut total_cost = 0;

        for &switch in state.switches().keys() {
            let mut push_total = 0;
            let mut best_approach: Option<u64> = None;

            for (&stone, &weight) in state.stones() {
                let push_cost = stone.manhattan(switch) * u64::from(weight);
                push_total += push_cost;

                let approach = agent.manhattan(stone) + push_cost;
                best_approach = Some(best_approach.map_or(approach, |best| best.min(approach)));
            }

            // Without stones there is nothing to approach.
            total_cost += push_total + best_approach.unwrap_or(0);
        }

        total_cost
    }
}
