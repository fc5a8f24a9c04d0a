//! Discrete environment interface used by the trainer.

use crate::error::{Error, Result};

/// Outcome of one environment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub next_state: usize,
    pub reward: f64,
    /// Episode reached a terminal state.
    pub terminated: bool,
    /// Episode was cut short, e.g. by a step budget.
    pub truncated: bool,
}

impl Step {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Discrete-state, discrete-action environment sampled through reset/step.
///
/// States and actions are indices in `0..n_states()` and `0..n_actions()`.
pub trait Environment {
    fn n_states(&self) -> usize;

    fn n_actions(&self) -> usize;

    /// Start a new episode and return its initial state.
    fn reset(&mut self) -> Result<usize>;

    /// Apply `action` to the current episode.
    fn step(&mut self, action: usize) -> Result<Step>;
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn n_states(&self) -> usize {
        (**self).n_states()
    }

    fn n_actions(&self) -> usize {
        (**self).n_actions()
    }

    fn reset(&mut self) -> Result<usize> {
        (**self).reset()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        (**self).step(action)
    }
}

/// Step budget wrapper.
///
/// Marks the step that spends the budget as truncated, and refuses to step an
/// episode that already ended until the next reset.
#[derive(Debug)]
pub struct StepLimit<E> {
    pub env: E,
    max_steps: Option<usize>,
    steps: usize,
    finished: bool,
}

impl<E: Environment> StepLimit<E> {
    /// `max_steps` of `None` only enforces the no-step-after-end rule.
    pub fn new(env: E, max_steps: Option<usize>) -> StepLimit<E> {
        // No episode is running before the first reset.
        StepLimit { env, max_steps, steps: 0, finished: true }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl<E: Environment> Environment for StepLimit<E> {
    fn n_states(&self) -> usize {
        self.env.n_states()
    }

    fn n_actions(&self) -> usize {
        self.env.n_actions()
    }

    fn reset(&mut self) -> Result<usize> {
        let state = self.env.reset()?;
        self.steps = 0;
        self.finished = false;
        Ok(state)
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if self.finished {
            return Err(Error::EpisodeFinished);
        }
        let mut step = self.env.step(action)?;
        self.steps += 1;
        if let Some(max_steps) = self.max_steps {
            if self.steps >= max_steps && !step.terminated {
                step.truncated = true;
            }
        }
        self.finished = step.done();
        Ok(step)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Walks right along a line of `n` states; the last state is terminal.
    struct Corridor {
        n: usize,
        pos: usize,
    }

    impl Environment for Corridor {
        fn n_states(&self) -> usize {
            self.n
        }

        fn n_actions(&self) -> usize {
            2
        }

        fn reset(&mut self) -> Result<usize> {
            self.pos = 0;
            Ok(0)
        }

        fn step(&mut self, action: usize) -> Result<Step> {
            if action == 1 {
                self.pos = (self.pos + 1).min(self.n - 1);
            }
            Ok(Step {
                next_state: self.pos,
                reward: -1.0,
                terminated: self.pos == self.n - 1,
                truncated: false,
            })
        }
    }

    #[test]
    fn truncates_at_budget() {
        // Arrange
        let mut env = StepLimit::new(Corridor { n: 10, pos: 0 }, Some(3));
        env.reset().unwrap();
        // Act
        let first = env.step(0).unwrap();
        let second = env.step(0).unwrap();
        let third = env.step(0).unwrap();
        // Assert
        assert!(!first.done());
        assert!(!second.done());
        assert!(third.truncated);
        assert!(!third.terminated);
        assert_eq!(env.steps(), 3);
    }

    #[test]
    fn terminal_step_is_not_truncated() {
        let mut env = StepLimit::new(Corridor { n: 2, pos: 0 }, Some(1));
        env.reset().unwrap();
        let step = env.step(1).unwrap();
        assert!(step.terminated);
        assert!(!step.truncated);
    }

    #[test]
    fn step_after_end_is_an_error() {
        // Arrange
        let mut env = StepLimit::new(Corridor { n: 2, pos: 0 }, None);
        env.reset().unwrap();
        assert!(env.step(1).unwrap().terminated);
        // Act
        let result = env.step(1);
        // Assert
        assert!(matches!(result, Err(Error::EpisodeFinished)));
        env.reset().unwrap();
        assert!(env.step(0).is_ok());
    }

    #[test]
    fn step_before_reset_is_an_error() {
        let mut env = StepLimit::new(Corridor { n: 3, pos: 0 }, None);
        assert!(matches!(env.step(0), Err(Error::EpisodeFinished)));
    }

    #[test]
    fn unlimited_budget_never_truncates() {
        let mut env = StepLimit::new(Corridor { n: 5, pos: 0 }, None);
        env.reset().unwrap();
        for _ in 0..1000 {
            assert!(!env.step(0).unwrap().truncated);
        }
    }
}
