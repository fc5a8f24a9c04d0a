//! Tabular reinforcement learning homework tools.
//!
//! - [`mdp`]: zero action-value tables for a list of MDP descriptions.
//! - [`trainer`]: SARSA and Q-learning over a discrete environment, with
//!   epsilon-greedy exploration and linearly decaying epsilon.

pub mod config;
pub mod env;
pub mod error;
pub mod exploration;
pub mod gym;
pub mod mdp;
pub mod observer;
pub mod policy;
pub mod qtable;
pub mod report;
pub mod td;
pub mod trainer;

pub use config::{AppConfig, Hyperparameters};
pub use env::{Environment, Step, StepLimit};
pub use error::{Error, Result};
pub use policy::Policy;
pub use qtable::QTable;
pub use td::TdMethod;
pub use trainer::Trainer;
