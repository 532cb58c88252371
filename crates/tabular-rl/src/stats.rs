/// Episodes averaged in progress reports.
pub const WINDOW: usize = 100;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeStats {
    rewards: Vec<f64>,
    lengths: Vec<usize>,
}

impl EpisodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reward: f64, length: usize) {
        self.rewards.push(reward);
        self.lengths.push(length);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Mean reward of the last [`WINDOW`] episodes, 0 when empty.
    pub fn mean_reward(&self) -> f64 {
        let recent = &self.rewards[self.rewards.len().saturating_sub(WINDOW)..];
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().sum::<f64>() / recent.len() as f64
    }

    pub fn mean_length(&self) -> f64 {
        let recent = &self.lengths[self.lengths.len().saturating_sub(WINDOW)..];
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().sum::<usize>() as f64 / recent.len() as f64
    }
}
