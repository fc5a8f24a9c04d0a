//! Temporal-difference update rules.
//!
//! Q-learning bootstraps from the best action at the next state, SARSA from
//! the action the behaviour policy actually picked there. Both treat the value
//! after a terminal step as exactly zero.

use std::fmt;

use crate::config::Hyperparameters;
use crate::qtable::QTable;

/// Which TD control rule to train with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TdMethod {
    /// Off-policy control
    QLearning,
    /// On-policy control
    Sarsa,
}

impl fmt::Display for TdMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TdMethod::QLearning => write!(f, "Q-learning"),
            TdMethod::Sarsa => write!(f, "SARSA"),
        }
    }
}

/// One environment step as seen by the update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: usize,
    pub action: usize,
    pub reward: f64,
    pub next_state: usize,
    pub next_action: usize,
    /// Episode ended on this step, by termination or truncation.
    pub done: bool,
}

impl TdMethod {
    /// Apply this method's update for one transition. Returns the TD error.
    pub fn update(self, q: &mut QTable, t: &Transition, params: &Hyperparameters) -> f64 {
        match self {
            TdMethod::QLearning => q_learning_update(
                q, t.state, t.action, t.reward, t.next_state, t.done,
                params.alpha, params.gamma),
            TdMethod::Sarsa => sarsa_update(
                q, t.state, t.action, t.reward, t.next_state, t.next_action, t.done,
                params.alpha, params.gamma),
        }
    }
}

/// Q(s,a) <- Q(s,a) + alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))
#[allow(clippy::too_many_arguments)]
pub fn q_learning_update(
    q: &mut QTable, state: usize, action: usize, reward: f64,
    next_state: usize, done: bool, alpha: f64, gamma: f64,
) -> f64 {
    let future = if done { 0.0 } else { q.max_value(next_state) };
    apply(q, state, action, reward + gamma * future, alpha)
}

/// Q(s,a) <- Q(s,a) + alpha * (r + gamma * Q(s',a') - Q(s,a))
#[allow(clippy::too_many_arguments)]
pub fn sarsa_update(
    q: &mut QTable, state: usize, action: usize, reward: f64,
    next_state: usize, next_action: usize, done: bool, alpha: f64, gamma: f64,
) -> f64 {
    let future = if done { 0.0 } else { q.get(next_state, next_action) };
    apply(q, state, action, reward + gamma * future, alpha)
}

fn apply(q: &mut QTable, state: usize, action: usize, target: f64, alpha: f64) -> f64 {
    let current = q.get(state, action);
    let td_error = target - current;
    q.set(state, action, current + alpha * td_error);
    td_error
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use test_case::test_case;

    /// Next state 1 has max value 2.0 at action 0 and 0.5 at action 1.
    fn divergent_table() -> QTable {
        QTable::from(array![[0.0, 0.0], [2.0, 0.5]])
    }

    #[test]
    fn q_learning_bootstraps_from_max() {
        // Arrange
        let mut q = divergent_table();
        // Act
        q_learning_update(&mut q, 0, 0, 1.0, 1, false, 0.5, 0.9);
        // Assert: 0 + 0.5 * (1 + 0.9 * 2.0 - 0)
        assert_abs_diff_eq!(q.get(0, 0), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn sarsa_bootstraps_from_selected_action() {
        // Arrange
        let mut q = divergent_table();
        // Act
        sarsa_update(&mut q, 0, 0, 1.0, 1, 1, false, 0.5, 0.9);
        // Assert: 0 + 0.5 * (1 + 0.9 * 0.5 - 0)
        assert_abs_diff_eq!(q.get(0, 0), 0.725, epsilon = 1e-12);
    }

    #[test]
    fn q_learning_ignores_next_action() {
        let params = Hyperparameters { alpha: 0.5, gamma: 0.9, ..Hyperparameters::default() };
        let mut q1 = divergent_table();
        let mut q2 = divergent_table();
        let t = Transition {
            state: 0, action: 1, reward: 0.0, next_state: 1, next_action: 0, done: false,
        };
        TdMethod::QLearning.update(&mut q1, &t, &params);
        TdMethod::QLearning.update(&mut q2, &Transition { next_action: 1, ..t }, &params);
        assert_eq!(q1, q2);
    }

    #[test_case(TdMethod::QLearning; "Q-learning")]
    #[test_case(TdMethod::Sarsa; "SARSA")]
    fn terminal_step_ignores_next_state(method: TdMethod) {
        // Arrange
        let params = Hyperparameters { alpha: 0.5, gamma: 0.9, ..Hyperparameters::default() };
        let mut q = QTable::from(array![[0.5, 0.0], [100.0, -100.0]]);
        let t = Transition {
            state: 0, action: 0, reward: 1.0, next_state: 1, next_action: 0, done: true,
        };
        // Act
        let td_error = method.update(&mut q, &t, &params);
        // Assert
        assert_abs_diff_eq!(q.get(0, 0), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(td_error, 0.5, epsilon = 1e-12);
        assert_eq!(q.get(1, 0), 100.0);
    }

    #[test]
    fn update_touches_single_entry() {
        let params = Hyperparameters::default();
        let mut q = divergent_table();
        let t = Transition {
            state: 0, action: 1, reward: -1.0, next_state: 1, next_action: 1, done: false,
        };
        TdMethod::Sarsa.update(&mut q, &t, &params);
        assert_eq!(q.get(0, 0), 0.0);
        assert_eq!(q.get(1, 0), 2.0);
        assert_eq!(q.get(1, 1), 0.5);
        assert!(q.get(0, 1) != 0.0);
    }

    #[test]
    fn method_names() {
        assert_eq!(TdMethod::QLearning.to_string(), "Q-learning");
        assert_eq!(TdMethod::Sarsa.to_string(), "SARSA");
    }
}
