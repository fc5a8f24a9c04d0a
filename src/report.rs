//! Output record for trained agents.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::ser::{Serialize, SerializeTuple, Serializer};

use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::qtable::QTable;

/// A finished Q-table together with its greedy policy.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedAgent {
    pub q: QTable,
    pub policy: Policy,
}

impl From<QTable> for TrainedAgent {
    fn from(q: QTable) -> Self {
        let policy = Policy::greedy(&q);
        TrainedAgent { q, policy }
    }
}

/// Both trained variants.
///
/// Serializes as `[q_learning_values, q_learning_policy, sarsa_values,
/// sarsa_policy]`, with values as `state -> action -> value` objects and
/// policies as `state -> action` objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub q_learning: TrainedAgent,
    pub sarsa: TrainedAgent,
}

type ValueMap = BTreeMap<usize, BTreeMap<usize, f64>>;
type PolicyMap = BTreeMap<usize, usize>;

impl Serialize for Submission {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element::<ValueMap>(&self.q_learning.q.to_map())?;
        tuple.serialize_element::<PolicyMap>(&self.q_learning.policy.to_map())?;
        tuple.serialize_element::<ValueMap>(&self.sarsa.q.to_map())?;
        tuple.serialize_element::<PolicyMap>(&self.sarsa.policy.to_map())?;
        tuple.end()
    }
}

/// Write the submission as JSON.
pub fn write_submission(path: &Path, submission: &Submission) -> Result<()> {
    let io_err = |source| Error::Io { path: path.to_path_buf(), source };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, submission).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}


#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::{json, Value};

    fn submission() -> Submission {
        Submission {
            q_learning: TrainedAgent::from(QTable::from(array![[0.0, -1.5], [2.0, 0.5]])),
            sarsa: TrainedAgent::from(QTable::from(array![[-2.0, -1.0], [0.0, 0.0]])),
        }
    }

    #[test]
    fn agent_carries_greedy_policy() {
        let agent = TrainedAgent::from(QTable::from(array![[0.0, 3.0], [1.0, 1.0]]));
        assert_eq!(agent.policy.actions, array![1, 0]);
    }

    #[test]
    fn serializes_as_four_element_list() {
        // Act
        let value = serde_json::to_value(submission()).unwrap();
        // Assert
        assert_eq!(value, json!([
            {"0": {"0": 0.0, "1": -1.5}, "1": {"0": 2.0, "1": 0.5}},
            {"0": 0, "1": 0},
            {"0": {"0": -2.0, "1": -1.0}, "1": {"0": 0.0, "1": 0.0}},
            {"0": 1, "1": 0}
        ]));
    }

    #[test]
    fn write_to_file() {
        // Arrange
        let path = std::env::temp_dir()
            .join(format!("tdlearn-submit-{}.json", std::process::id()));
        // Act
        write_submission(&path, &submission()).unwrap();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        // Assert
        assert_eq!(value.as_array().map(Vec::len), Some(4));
        assert_eq!(value[3]["0"], json!(1));
    }
}
