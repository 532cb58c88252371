/// Outcome of one environment transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub next_state: usize,
    pub reward: f64,
    pub done: bool,
}

/// An episodic environment with finitely many states and actions, both
/// numbered from zero.
pub trait DiscreteEnvironment {
    fn states(&self) -> usize;
    fn actions(&self) -> usize;
    /// Starts a new episode and returns its initial state.
    fn reset(&mut self) -> usize;
    fn step(&mut self, action: usize) -> Step;
    fn render(&self) {}
}
