//! Error types for tdlearn.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to read configuration file: {0}")]
    Config(#[from] config_file::ConfigFileError),

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid MDP description: {message}")]
    InvalidMdp { message: String },

    #[error("environment error: {message}")]
    Environment { message: String },

    #[error("HTTP request to environment failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("environment '{env_id}' has a non-discrete {space} space")]
    UnsupportedSpace { env_id: String, space: String },

    #[error("action {action} is out of range (action space has {n_actions} actions)")]
    InvalidAction { action: usize, n_actions: usize },

    #[error("state {state} is out of range (state space has {n_states} states)")]
    InvalidState { state: usize, n_states: usize },

    #[error("cannot step an episode that has already ended")]
    EpisodeFinished,

    #[error("environment has an empty {space} space")]
    EmptySpace { space: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias for results carrying the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn environment(message: impl Into<String>) -> Self {
        Error::Environment {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}
