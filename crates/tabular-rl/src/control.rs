use log::info;

use crate::config::ControlConfig;
use crate::env::{DiscreteEnvironment, Step};
use crate::error::{Result, RlError};
use crate::qtable::QTable;
use crate::schedule::Schedule;
use crate::stats::EpisodeStats;

/// Per-episode hyperparameters after decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeParams {
    pub epsilon: f64,
    pub alpha: f64,
    pub render: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    pub reward: f64,
    /// Steps taken.
    pub length: usize,
}

/// A learner that keeps a [`QTable`] and improves it one episode at a time.
pub trait TabularAgent {
    fn q(&self) -> &QTable;

    fn run_episode<E: DiscreteEnvironment>(
        &mut self,
        env: &mut E,
        params: EpisodeParams,
    ) -> Result<EpisodeOutcome>;
}

/// Runs `config.episodes` episodes, decaying epsilon and alpha between them.
pub fn train<A, E>(agent: &mut A, env: &mut E, config: &ControlConfig) -> Result<EpisodeStats>
where
    A: TabularAgent,
    E: DiscreteEnvironment,
{
    config.validate()?;
    let found = (env.states(), env.actions());
    if agent.q().shape() != found {
        return Err(RlError::ShapeMismatch {
            expected: agent.q().shape(),
            found,
        });
    }

    let epsilon = Schedule::new(config.epsilon, config.epsilon_final, config.episodes);
    let alpha = Schedule::new(config.alpha, config.alpha_final, config.episodes);
    let mut stats = EpisodeStats::new();

    for episode in 0..config.episodes {
        let params = EpisodeParams {
            epsilon: epsilon.value(episode),
            alpha: alpha.value(episode),
            render: config.render_each > 0 && episode > 0 && episode % config.render_each == 0,
        };
        let outcome = agent.run_episode(env, params)?;
        stats.push(outcome.reward, outcome.length);

        if stats.len() % 10 == 0 {
            info!(
                "Episode {}, mean 100-episode reward {:.3}, mean 100-episode length {:.1}, epsilon {:.4}, alpha {:.4}",
                episode + 1,
                stats.mean_reward(),
                stats.mean_length(),
                params.epsilon,
                params.alpha
            );
        }
    }

    Ok(stats)
}

pub(crate) fn check_dimensions<E: DiscreteEnvironment>(env: &E) -> Result<(usize, usize)> {
    let (states, actions) = (env.states(), env.actions());
    if states == 0 || actions == 0 {
        return Err(RlError::EmptyEnvironment);
    }
    Ok((states, actions))
}

pub(crate) fn check_state(state: usize, q: &QTable) -> Result<usize> {
    if state >= q.states() {
        return Err(RlError::InvalidState {
            state,
            states: q.states(),
        });
    }
    Ok(state)
}

pub(crate) fn checked_step<E: DiscreteEnvironment>(
    env: &mut E,
    action: usize,
    q: &QTable,
) -> Result<Step> {
    let step = env.step(action);
    check_state(step.next_state, q)?;
    Ok(step)
}
