use serde::{Deserialize, Serialize};

use crate::error::{Result, RlError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub episodes: usize,
    /// Steps after which an episode is cut off.
    pub max_steps: usize,
    /// Render every n-th episode; 0 never renders.
    pub render_each: usize,
    pub epsilon: f64,
    /// Exploration rate reached after the last episode, decayed log-linearly.
    pub epsilon_final: Option<f64>,
    pub gamma: f64,
    /// Learning rate (Q-learning only).
    pub alpha: f64,
    pub alpha_final: Option<f64>,
    pub seed: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps: 500,
            render_each: 0,
            epsilon: 0.5,
            epsilon_final: Some(0.001),
            gamma: 0.99,
            alpha: 0.5,
            alpha_final: None,
            seed: 42,
        }
    }
}

impl ControlConfig {
    /// Defaults for undiscounted Monte Carlo control.
    pub fn monte_carlo() -> Self {
        Self {
            epsilon_final: Some(0.01),
            gamma: 1.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(RlError::InvalidConfig("episodes must be positive".into()));
        }
        if self.max_steps == 0 {
            return Err(RlError::InvalidConfig("max_steps must be positive".into()));
        }
        if !(self.epsilon > 0.0 && self.epsilon <= 1.0) {
            return Err(RlError::InvalidConfig(format!(
                "epsilon must be in (0, 1], got {}",
                self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(RlError::InvalidConfig(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(RlError::InvalidConfig(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        let targets = [
            ("epsilon_final", self.epsilon_final),
            ("alpha_final", self.alpha_final),
        ];
        for (name, target) in targets {
            if let Some(value) = target {
                if value <= 0.0 {
                    return Err(RlError::InvalidConfig(format!(
                        "{name} must be positive, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}
