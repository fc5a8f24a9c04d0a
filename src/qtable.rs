use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView1};

/// Dense action-value table.
///
/// Indexes are [state, action]. The shape is fixed by the environment when the
/// table is created and every entry starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Array2<f64>,
}

impl QTable {
    pub fn new(n_states: usize, n_actions: usize) -> QTable {
        QTable { values: Array2::<f64>::zeros((n_states, n_actions)) }
    }

    pub fn n_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_actions(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[[state, action]]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        self.values[[state, action]] = value;
    }

    /// Action values for one state.
    pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
        self.values.row(state)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Largest action value in `state`.
    pub fn max_value(&self, state: usize) -> f64 {
        self.row(state).fold(f64::NEG_INFINITY, |acc, &q| acc.max(q))
    }

    /// Action with the largest value in `state`. Ties go to the lowest index.
    pub fn greedy_action(&self, state: usize) -> usize {
        let mut best = 0;
        let mut best_q = f64::NEG_INFINITY;
        for (action, &q) in self.row(state).iter().enumerate() {
            // Strict comparison keeps the first of equal values.
            if q > best_q {
                best = action;
                best_q = q;
            }
        }
        best
    }

    /// Nested state -> action -> value map for serialization.
    pub fn to_map(&self) -> BTreeMap<usize, BTreeMap<usize, f64>> {
        self.values
            .outer_iter()
            .enumerate()
            .map(|(s, row)| (s, row.iter().copied().enumerate().collect()))
            .collect()
    }
}

impl From<Array2<f64>> for QTable {
    fn from(values: Array2<f64>) -> Self {
        QTable { values }
    }
}
