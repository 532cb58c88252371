/// Log-linear decay from `start` to `end` over `episodes`, constant when no
/// end is given. Episodes past the end keep the final value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    start: f64,
    end: Option<f64>,
    episodes: usize,
}

impl Schedule {
    pub fn new(start: f64, end: Option<f64>, episodes: usize) -> Self {
        Self {
            start,
            end,
            episodes,
        }
    }

    /// Value in effect during the zero-based `episode`.
    pub fn value(&self, episode: usize) -> f64 {
        match self.end {
            Some(end) if self.episodes > 0 => {
                let progress = episode.min(self.episodes) as f64 / self.episodes as f64;
                let (from, to) = (self.start.ln(), end.ln());
                (from + (to - from) * progress).exp()
            }
            _ => self.start,
        }
    }
}
