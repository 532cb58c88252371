use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffled traversal over `0..size`, consumed front to back and reshuffled
/// once an epoch is exhausted.
#[derive(Debug, Clone)]
pub struct EpochScheduler {
    size: usize,
    permutation: Vec<usize>,
    cursor: usize,
    rng: StdRng,
}

impl EpochScheduler {
    pub fn new(size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let permutation = shuffled(size, &mut rng);
        Self {
            size,
            permutation,
            cursor: 0,
            rng,
        }
    }

    /// Takes up to `n` indices from the front of the current permutation.
    pub fn take(&mut self, n: usize) -> Vec<usize> {
        let end = (self.cursor + n).min(self.permutation.len());
        let indices = self.permutation[self.cursor..end].to_vec();
        self.cursor = end;
        indices
    }

    pub fn remaining(&self) -> usize {
        self.permutation.len() - self.cursor
    }

    /// Returns `true` and starts a fresh permutation if the current one is
    /// exhausted; otherwise leaves the state untouched.
    pub fn epoch_finished(&mut self) -> bool {
        if self.remaining() > 0 {
            return false;
        }
        self.permutation = shuffled(self.size, &mut self.rng);
        self.cursor = 0;
        debug!("Reshuffled permutation over {} essays", self.size);
        true
    }
}

fn shuffled(size: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut permutation: Vec<usize> = (0..size).collect();
    permutation.shuffle(rng);
    permutation
}
