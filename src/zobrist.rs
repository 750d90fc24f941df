use std::hash::{Hash, Hasher};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, Position};
use crate::game::PuzzleState;

/// Deduplication key for a state.
///
/// Hashing uses only the precomputed Zobrist value; equality compares the
/// agent, the stone positions and the covered switches in full, so two
/// distinct configurations never compare equal. Stone weights do not take part.
#[derive(Debug, Clone, Eq)]
pub struct StateKey {
    hash: u64,
    agent: Position,
    stones: Box<[Position]>,
    covered: Box<[Position]>,
}

impl StateKey {
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for StateKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.agent == other.agent
            && self.stones == other.stones
            && self.covered == other.covered
    }
}

impl Hash for StateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Zobrist tables for one board
pub struct Zobrist {
    cols: usize,
    agent_hashes: Vec<u64>,
    stone_hashes: Vec<u64>,
    covered_hashes: Vec<u64>,
}

impl Zobrist {
    pub fn new(board: &Board) -> Self {
        // Use a seeded PRNG for reproducible Zobrist hashes
        let mut rng = ChaCha8Rng::seed_from_u64(0x123456789abcdef0);
        let cells = board.rows() * board.cols();

        let mut table = || (0..cells).map(|_| rng.next_u64()).collect::<Vec<u64>>();
        let agent_hashes = table();
        let stone_hashes = table();
        let covered_hashes = table();

        Zobrist {
            cols: board.cols(),
            agent_hashes,
            stone_hashes,
            covered_hashes,
        }
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Compute the deduplication key of a state on this board.
    pub fn key(&self, state: &PuzzleState) -> StateKey {
        let agent = state.agent();
        let mut hash = self.agent_hashes[self.index(agent)];

        let stones: Box<[Position]> = state.stones().keys().copied().collect();
        for &pos in stones.iter() {
            hash ^= self.stone_hashes[self.index(pos)];
        }

        let covered: Box<[Position]> = state
            .switches()
            .iter()
            .filter(|&(_, &covered)| covered)
            .map(|(&pos, _)| pos)
            .collect();
        for &pos in covered.iter() {
            hash ^= self.covered_hashes[self.index(pos)];
        }

        StateKey {
            hash,
            agent,
            stones,
            covered,
        }
    }
}
