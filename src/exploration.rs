//! Epsilon-greedy exploration and the per-episode epsilon schedule.

use rand::Rng;

use crate::error::{Error, Result};
use crate::qtable::QTable;

/// Pick an action for `state`.
///
/// With probability `epsilon` the action is drawn uniformly from the whole
/// action space, otherwise it is the greedy action of the table.
pub fn select_action_eps_greedy<R: Rng + ?Sized>(
    q: &QTable, state: usize, epsilon: f64, rng: &mut R,
) -> usize {
    if rng.gen::<f64>() < epsilon {
        rng.gen_range(0..q.n_actions())
    } else {
        q.greedy_action(state)
    }
}

/// Epsilon decaying linearly from `max_epsilon` at the first episode to zero
/// at the last one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    max_epsilon: f64,
    episodes: usize,
}

impl LinearDecay {
    pub fn new(max_epsilon: f64, episodes: usize) -> Result<LinearDecay> {
        if episodes == 0 {
            return Err(Error::invalid_config("epsilon schedule needs at least one episode"));
        }
        if !(0.0..=1.0).contains(&max_epsilon) {
            return Err(Error::invalid_config(format!(
                "max_epsilon must be in [0, 1], got {max_epsilon}")));
        }
        Ok(LinearDecay { max_epsilon, episodes })
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Exploration rate for a 1-based episode index.
    pub fn epsilon(&self, episode: usize) -> f64 {
        // A single episode is also the last one.
        if self.episodes == 1 || episode >= self.episodes {
            return 0.0;
        }
        let remaining = (self.episodes - episode.max(1)) as f64;
        self.max_epsilon * remaining / (self.episodes - 1) as f64
    }
}
