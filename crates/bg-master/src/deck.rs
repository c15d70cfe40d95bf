//! Grid content for each round.
//!
//! A deck keeps its words in a stable shuffled order for the whole game.
//! Each round draws from the top of that order: two distinct words in round
//! one, two more every round after, never more than fit the grid. The
//! chosen words are repeated to fill every slot and their positions are
//! shuffled.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Distinct words shown in round one.
const FIRST_ROUND_VARIETY: usize = 2;
/// Distinct words added each round.
const VARIETY_STEP: usize = 2;

/// Shuffled word pool and the grids built from it.
#[derive(Clone, Debug)]
pub struct Deck {
    pool: Vec<String>,
    rng: StdRng,
}

impl Deck {
    /// Deck over `words` with a random order.
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::seeded(words, rand::random())
    }

    /// Deck with a reproducible order.
    pub fn seeded(words: impl IntoIterator<Item = impl Into<String>>, seed: u64) -> Self {
        let mut deck = Self {
            pool: words.into_iter().map(Into::into).collect(),
            rng: StdRng::seed_from_u64(seed),
        };
        deck.reshuffle();
        deck
    }

    /// Draw a fresh pool order, as when a new game is set up.
    pub fn reshuffle(&mut self) {
        self.pool.shuffle(&mut self.rng);
    }

    /// Words in pool order.
    pub fn words(&self) -> &[String] {
        &self.pool
    }

    /// Number of distinct words in a grid for `round`.
    ///
    /// While not playing (a preview) the grid shows as many words as fit.
    pub fn variety(&self, round: u32, grid_size: usize, playing: bool) -> usize {
        let cap = if playing {
            let steps = round.saturating_sub(1) as usize;
            FIRST_ROUND_VARIETY + steps * VARIETY_STEP
        } else {
            grid_size
        };
        self.pool.len().min(cap).min(grid_size)
    }

    /// Build the grid for `round`: `grid_size` slots, or none if the pool
    /// is empty.
    pub fn grid(&mut self, round: u32, grid_size: usize, playing: bool) -> Vec<String> {
        let distinct = self.variety(round, grid_size, playing);
        if distinct == 0 {
            return Vec::new();
        }

        let mut grid: Vec<String> = self.pool[..distinct]
            .iter()
            .cycle()
            .take(grid_size)
            .cloned()
            .collect();
        grid.shuffle(&mut self.rng);
        grid
    }
}
