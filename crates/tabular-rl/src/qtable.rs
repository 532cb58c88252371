/// Action values, one row of `actions` entries per state.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    states: usize,
    actions: usize,
    values: Vec<f64>,
}

impl QTable {
    pub fn new(states: usize, actions: usize) -> Self {
        Self {
            states,
            actions,
            values: vec![0.0; states * actions],
        }
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.states, self.actions)
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[state * self.actions + action]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        self.values[state * self.actions + action] = value;
    }

    pub fn row(&self, state: usize) -> &[f64] {
        &self.values[state * self.actions..(state + 1) * self.actions]
    }

    /// Greedy action; ties go to the lowest action.
    pub fn argmax(&self, state: usize) -> usize {
        let row = self.row(state);
        let mut best = 0;
        for (action, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = action;
            }
        }
        best
    }

    pub fn max(&self, state: usize) -> f64 {
        self.row(state)[self.argmax(state)]
    }

    /// Greedy action of every state.
    pub fn policy(&self) -> Vec<usize> {
        (0..self.states).map(|state| self.argmax(state)).collect()
    }
}
