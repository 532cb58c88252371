use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::qtable::QTable;

/// Picks a uniformly random action with probability epsilon, else the greedy one.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn select(&mut self, q: &QTable, state: usize, epsilon: f64) -> usize {
        if self.rng.gen::<f64>() < epsilon {
            self.rng.gen_range(0..q.actions())
        } else {
            q.argmax(state)
        }
    }
}
