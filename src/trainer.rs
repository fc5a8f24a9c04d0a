//! Tabular TD training loop.
//!
//! Each episode runs RESET -> ACT -> OBSERVE -> UPDATE, repeating ACT to
//! UPDATE until the environment reports termination or truncation. Training
//! runs a fixed number of episodes with no convergence check.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::config::Hyperparameters;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::exploration::{select_action_eps_greedy, LinearDecay};
use crate::observer::{EpisodeSummary, TrainingObserver};
use crate::qtable::QTable;
use crate::td::{TdMethod, Transition};

/// Seeded RNG when a seed is given, entropy-seeded otherwise.
pub fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[derive(Debug, Clone)]
pub struct Trainer {
    method: TdMethod,
    params: Hyperparameters,
    schedule: LinearDecay,
}

impl Trainer {
    pub fn new(method: TdMethod, params: Hyperparameters) -> Result<Trainer> {
        params.validate()?;
        let schedule = LinearDecay::new(params.max_epsilon, params.episodes_number)?;
        Ok(Trainer { method, params, schedule })
    }

    pub fn method(&self) -> TdMethod {
        self.method
    }

    pub fn params(&self) -> &Hyperparameters {
        &self.params
    }

    /// Learn a Q-table from scratch over the configured number of episodes.
    ///
    /// Any environment or observer error aborts the run and no table is
    /// returned.
    pub fn train<E, R, O>(&self, env: &mut E, rng: &mut R, observer: &mut O) -> Result<QTable>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
        O: TrainingObserver + ?Sized,
    {
        let n_states = env.n_states();
        let n_actions = env.n_actions();
        if n_states == 0 {
            return Err(Error::EmptySpace { space: String::from("observation") });
        }
        if n_actions == 0 {
            return Err(Error::EmptySpace { space: String::from("action") });
        }

        let mut q = QTable::new(n_states, n_actions);
        observer.on_training_start(self.method, self.schedule.episodes())?;
        for episode in 1..=self.schedule.episodes() {
            let epsilon = self.schedule.epsilon(episode);
            let summary = self.run_episode(&mut q, env, episode, epsilon, rng)?;
            observer.on_episode_end(&summary)?;
        }
        observer.on_training_end(self.method, &q)?;
        Ok(q)
    }

    /// Play one episode with a fixed `epsilon`, updating `q` after every step.
    pub fn run_episode<E, R>(
        &self, q: &mut QTable, env: &mut E, episode: usize, epsilon: f64, rng: &mut R,
    ) -> Result<EpisodeSummary>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        // RESET
        let mut state = checked_state(env.reset()?, q.n_states())?;
        let mut action = select_action_eps_greedy(q, state, epsilon, rng);
        let mut total_reward = 0.0;
        let mut steps = 0;

        loop {
            // ACT, OBSERVE
            let step = env.step(action)?;
            let next_state = checked_state(step.next_state, q.n_states())?;

            // UPDATE. The next action is chosen for both methods, only SARSA
            // bootstraps from it.
            let next_action = select_action_eps_greedy(q, next_state, epsilon, rng);
            let transition = Transition {
                state,
                action,
                reward: step.reward,
                next_state,
                next_action,
                done: step.done(),
            };
            let td_error = self.method.update(q, &transition, &self.params);
            trace!(episode, state, action, reward = step.reward, next_state, td_error);

            total_reward += step.reward;
            steps += 1;
            state = next_state;
            action = next_action;

            if step.done() {
                return Ok(EpisodeSummary {
                    episode,
                    epsilon,
                    total_reward,
                    steps,
                    truncated: step.truncated && !step.terminated,
                });
            }
        }
    }
}

fn checked_state(state: usize, n_states: usize) -> Result<usize> {
    if state < n_states {
        Ok(state)
    } else {
        Err(Error::InvalidState { state, n_states })
    }
}
