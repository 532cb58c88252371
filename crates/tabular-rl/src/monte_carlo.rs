use crate::config::ControlConfig;
use crate::control::{
    check_dimensions, check_state, checked_step, EpisodeOutcome, EpisodeParams, TabularAgent,
};
use crate::env::DiscreteEnvironment;
use crate::error::Result;
use crate::policy::EpsilonGreedy;
use crate::qtable::QTable;

/// Every-visit Monte Carlo control: `Q[s, a]` is the mean of all returns
/// observed after taking `a` in `s`.
#[derive(Debug, Clone)]
pub struct MonteCarloControl {
    q: QTable,
    return_sums: Vec<f64>,
    visits: Vec<u64>,
    gamma: f64,
    max_steps: usize,
    policy: EpsilonGreedy,
}

impl MonteCarloControl {
    pub fn new<E: DiscreteEnvironment>(env: &E, config: &ControlConfig) -> Result<Self> {
        config.validate()?;
        let (states, actions) = check_dimensions(env)?;
        Ok(Self {
            q: QTable::new(states, actions),
            return_sums: vec![0.0; states * actions],
            visits: vec![0; states * actions],
            gamma: config.gamma,
            max_steps: config.max_steps,
            policy: EpsilonGreedy::new(config.seed),
        })
    }

    pub fn visits(&self, state: usize, action: usize) -> u64 {
        self.visits[state * self.q.actions() + action]
    }
}

impl TabularAgent for MonteCarloControl {
    fn q(&self) -> &QTable {
        &self.q
    }

    fn run_episode<E: DiscreteEnvironment>(
        &mut self,
        env: &mut E,
        params: EpisodeParams,
    ) -> Result<EpisodeOutcome> {
        let mut state = check_state(env.reset(), &self.q)?;
        let mut trajectory = Vec::new();
        let mut total = 0.0;

        for _ in 0..self.max_steps {
            if params.render {
                env.render();
            }
            let action = self.policy.select(&self.q, state, params.epsilon);
            let step = checked_step(env, action, &self.q)?;
            total += step.reward;
            trajectory.push((state, action, step.reward));
            state = step.next_state;
            if step.done {
                break;
            }
        }

        let mut ret = 0.0;
        for &(state, action, reward) in trajectory.iter().rev() {
            ret = reward + self.gamma * ret;
            let index = state * self.q.actions() + action;
            self.return_sums[index] += ret;
            self.visits[index] += 1;
            let mean = self.return_sums[index] / self.visits[index] as f64;
            self.q.set(state, action, mean);
        }

        Ok(EpisodeOutcome {
            reward: total,
            length: trajectory.len(),
        })
    }
}
