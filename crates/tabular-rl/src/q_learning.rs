use crate::config::ControlConfig;
use crate::control::{
    check_dimensions, check_state, checked_step, EpisodeOutcome, EpisodeParams, TabularAgent,
};
use crate::env::DiscreteEnvironment;
use crate::error::Result;
use crate::policy::EpsilonGreedy;
use crate::qtable::QTable;

/// Off-policy TD control: `Q[s, a] += alpha * (r + gamma * max Q[s'] - Q[s, a])`.
#[derive(Debug, Clone)]
pub struct QLearning {
    q: QTable,
    gamma: f64,
    max_steps: usize,
    policy: EpsilonGreedy,
}

impl QLearning {
    pub fn new<E: DiscreteEnvironment>(env: &E, config: &ControlConfig) -> Result<Self> {
        config.validate()?;
        let (states, actions) = check_dimensions(env)?;
        Ok(Self {
            q: QTable::new(states, actions),
            gamma: config.gamma,
            max_steps: config.max_steps,
            policy: EpsilonGreedy::new(config.seed),
        })
    }
}

impl TabularAgent for QLearning {
    fn q(&self) -> &QTable {
        &self.q
    }

    fn run_episode<E: DiscreteEnvironment>(
        &mut self,
        env: &mut E,
        params: EpisodeParams,
    ) -> Result<EpisodeOutcome> {
        let mut state = check_state(env.reset(), &self.q)?;
        let mut total = 0.0;
        let mut length = 0;

        for _ in 0..self.max_steps {
            if params.render {
                env.render();
            }
            let action = self.policy.select(&self.q, state, params.epsilon);
            let step = checked_step(env, action, &self.q)?;
            total += step.reward;
            length += 1;

            let target = step.reward + self.gamma * self.q.max(step.next_state);
            let value = self.q.get(state, action);
            self.q.set(state, action, value + params.alpha * (target - value));

            state = step.next_state;
            if step.done {
                break;
            }
        }

        Ok(EpisodeOutcome {
            reward: total,
            length,
        })
    }
}
