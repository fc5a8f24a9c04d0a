//! Markov Decision Process descriptions and their zero action-value tables.
//!
//! States, actions and successors are arbitrary string identifiers, so the
//! tables here are sparse maps rather than the dense arrays used for training.
//! Maps keep the order in which keys appear in the input file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use approx::abs_diff_eq;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// successor -> value
pub type SuccessorMap = IndexMap<String, f64>;

/// state -> action -> successor -> value
pub type TransitionTable = IndexMap<String, IndexMap<String, SuccessorMap>>;

/// state -> action -> action value
pub type ActionValues = IndexMap<String, IndexMap<String, f64>>;

/// One MDP: transition probabilities and rewards for every
/// (state, action, successor) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdpDescription {
    pub transition_probs: TransitionTable,
    pub reward_function: TransitionTable,
}

impl MdpDescription {
    /// Number of declared states.
    pub fn n_states(&self) -> usize {
        self.transition_probs.len()
    }

    /// Check that every (state, action) row is a probability distribution and
    /// that every transition has a reward.
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        for (state, actions) in &self.transition_probs {
            for (action, successors) in actions {
                if let Some((next, p)) = successors.iter().find(|(_, p)| **p < 0.0) {
                    return Err(invalid(format!(
                        "negative probability {p} for ({state}, {action}) -> {next}")));
                }
                let total: f64 = successors.values().sum();
                if !abs_diff_eq!(total, 1.0, epsilon = tolerance) {
                    return Err(invalid(format!(
                        "probabilities for ({state}, {action}) sum to {total}")));
                }
                for next in successors.keys() {
                    let reward = self.reward_function
                        .get(state)
                        .and_then(|a| a.get(action))
                        .and_then(|s| s.get(next));
                    if reward.is_none() {
                        return Err(invalid(format!(
                            "missing reward for ({state}, {action}) -> {next}")));
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidMdp { message }
}

/// Build the all-zero action-value table over the states and per-state
/// actions declared in `transition_probs`.
pub fn zero_action_values(mdp: &MdpDescription) -> ActionValues {
    mdp.transition_probs
        .iter()
        .map(|(state, actions)| {
            let row = actions.keys().map(|action| (action.clone(), 0.0)).collect();
            (state.clone(), row)
        })
        .collect()
}

/// Zero tables for a whole collection, in input order.
pub fn initialize_all(mdps: &[MdpDescription]) -> Vec<ActionValues> {
    mdps.iter().map(zero_action_values).collect()
}

/// Read an ordered list of MDP descriptions from a JSON file.
pub fn read_mdps(path: &Path) -> Result<Vec<MdpDescription>> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one action-value table per MDP as a JSON list.
pub fn write_action_values(path: &Path, tables: &[ActionValues]) -> Result<()> {
    let io_err = |source| Error::Io { path: path.to_path_buf(), source };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, tables).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}
