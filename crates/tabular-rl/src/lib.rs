pub mod config;
pub mod control;
pub mod env;
pub mod error;
pub mod monte_carlo;
pub mod policy;
pub mod q_learning;
pub mod qtable;
pub mod schedule;
pub mod stats;

pub use config::ControlConfig;
pub use control::{train, EpisodeOutcome, EpisodeParams, TabularAgent};
pub use env::{DiscreteEnvironment, Step};
pub use error::RlError;
pub use monte_carlo::MonteCarloControl;
pub use policy::EpsilonGreedy;
pub use q_learning::QLearning;
pub use qtable::QTable;
pub use schedule::Schedule;
pub use stats::EpisodeStats;
