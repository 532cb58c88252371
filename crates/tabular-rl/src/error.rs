use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Environment has no states or no actions")]
    EmptyEnvironment,

    #[error("Q table is {expected:?} (states, actions) but the environment is {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Environment returned state {state}, expected fewer than {states}")]
    InvalidState { state: usize, states: usize },
}

pub type Result<T> = std::result::Result<T, RlError>;
