use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Learning hyperparameters, fixed for the whole training run.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Hyperparameters {
    /// Learning rate (alpha)
    pub alpha: f64,
    /// Discount rate (gamma)
    pub gamma: f64,
    /// Exploration rate used for the first episode
    pub max_epsilon: f64,
    /// Number of training episodes
    pub episodes_number: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            alpha: 0.1,
            gamma: 0.9,
            max_epsilon: 0.2,
            episodes_number: 10000,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::invalid_config(format!(
                "alpha must be in (0, 1], got {}", self.alpha)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::invalid_config(format!(
                "gamma must be in [0, 1], got {}", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.max_epsilon) {
            return Err(Error::invalid_config(format!(
                "max_epsilon must be in [0, 1], got {}", self.max_epsilon)));
        }
        if self.episodes_number == 0 {
            return Err(Error::invalid_config("episodes_number must be at least 1"));
        }
        Ok(())
    }
}

/// Settings for the training driver that are not learning hyperparameters.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Seed for the exploration RNG. Seeded from entropy when absent.
    pub seed: Option<u64>,
    /// Log a progress line every `log_every` episodes.
    pub log_every: usize,
    /// Truncate episodes after this many steps.
    pub max_episode_steps: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            seed: None,
            log_every: 100,
            max_episode_steps: None,
        }
    }
}

/// Location of the gymnasium HTTP server and the environment to create there.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GymConfig {
    pub base_url: String,
    pub env_id: String,
}

impl Default for GymConfig {
    fn default() -> Self {
        GymConfig {
            base_url: String::from("http://127.0.0.1:5000"),
            env_id: String::from("CliffWalking-v0"),
        }
    }
}

/// Hold information read from the TOML configuration file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub hyperparameters: Hyperparameters,
    pub training: TrainingConfig,
    pub gym: GymConfig,
}

impl AppConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<AppConfig> {
        let config = AppConfig::from_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.hyperparameters.validate()?;
        if self.training.log_every == 0 {
            return Err(Error::invalid_config("log_every must be at least 1"));
        }
        if self.training.max_episode_steps == Some(0) {
            return Err(Error::invalid_config("max_episode_steps must be at least 1"));
        }
        if self.gym.env_id.is_empty() {
            return Err(Error::invalid_config("gym.env_id must not be empty"));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir()
            .join(format!("tdlearn-{}-{}.toml", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults_match_assignment_values() {
        // Act
        let config = AppConfig::default();
        // Assert
        assert_eq!(config.hyperparameters.alpha, 0.1);
        assert_eq!(config.hyperparameters.gamma, 0.9);
        assert_eq!(config.hyperparameters.max_epsilon, 0.2);
        assert_eq!(config.hyperparameters.episodes_number, 10000);
        assert_eq!(config.training.log_every, 100);
        assert_eq!(config.gym.env_id, "CliffWalking-v0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_partial_toml_fills_defaults() {
        // Arrange
        let path = write_config("partial", r#"
[hyperparameters]
episodes_number = 500

[training]
seed = 7
"#);
        // Act
        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        // Assert
        assert_eq!(config.hyperparameters.episodes_number, 500);
        assert_eq!(config.hyperparameters.alpha, 0.1);
        assert_eq!(config.training.seed, Some(7));
        assert_eq!(config.training.max_episode_steps, None);
        assert_eq!(config.gym, GymConfig::default());
    }

    #[test]
    fn load_rejects_invalid_values() {
        // Arrange
        let path = write_config("invalid", r#"
[hyperparameters]
episodes_number = 0
"#);
        // Act
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        // Assert
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test_case(0.0, 0.9, 0.2, 10; "Zero learning rate")]
    #[test_case(1.5, 0.9, 0.2, 10; "Learning rate above one")]
    #[test_case(0.1, -0.1, 0.2, 10; "Negative discount")]
    #[test_case(0.1, 0.9, 1.2, 10; "Epsilon above one")]
    #[test_case(0.1, 0.9, 0.2, 0; "No episodes")]
    fn invalid_hyperparameters(alpha: f64, gamma: f64, max_epsilon: f64, episodes_number: usize) {
        let params = Hyperparameters { alpha, gamma, max_epsilon, episodes_number };
        assert!(params.validate().is_err());
    }

    #[test]
    fn single_episode_is_valid() {
        let params = Hyperparameters { episodes_number: 1, ..Hyperparameters::default() };
        assert!(params.validate().is_ok());
    }
}
