use std::collections::BTreeMap;

use crate::qtable::QTable;

/// Deterministic policy: one action per state.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub actions: ndarray::Array1<usize>,
}

impl Policy {
    /// Greedy policy with respect to a finished action-value table.
    pub fn greedy(q: &QTable) -> Policy {
        let actions = (0..q.n_states())
            .map(|s| q.greedy_action(s))
            .collect::<ndarray::Array1<usize>>();
        Policy { actions }
    }

    pub fn action(&self, state: usize) -> usize {
        self.actions[state]
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<usize, usize> {
        self.actions.iter().copied().enumerate().collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn build_greedy_policy() {
        // Arrange
        let q = QTable::from(array![
            [0.0, 1.0, 0.5],
            [2.0, 2.0, 1.0],
            [0.0, 0.0, 0.0],
            [-1.0, -4.0, -0.5]
        ]);
        // Act
        let pi = Policy::greedy(&q);
        // Assert
        assert_eq!(pi.len(), 4);
        assert_eq!(pi.actions, array![1, 0, 0, 2]);
        assert_eq!(pi.action(3), 2);
    }

    #[test]
    fn greedy_policy_leaves_table_untouched() {
        let q = QTable::from(array![[0.3, 0.1], [0.0, 0.9]]);
        let before = q.clone();
        let _ = Policy::greedy(&q);
        assert_eq!(q, before);
    }

    #[test]
    fn policy_map_has_every_state() {
        let pi = Policy::greedy(&QTable::new(5, 2));
        let map = pi.to_map();
        assert_eq!(map.len(), 5);
        assert!(map.values().all(|&a| a == 0));
    }
}
