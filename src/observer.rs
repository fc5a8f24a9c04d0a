//! Observers for training runs.
//!
//! The trainer reports progress through [`TrainingObserver`] and never does
//! I/O itself. Observers can log, export, or be composed with [`Observers`].

use std::collections::VecDeque;
use std::io::Write;

use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::info;

use crate::error::Result;
use crate::qtable::QTable;
use crate::td::TdMethod;

/// What happened in one finished episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// 1-based episode index
    pub episode: usize,
    /// Exploration rate used for the whole episode
    pub epsilon: f64,
    /// Undiscounted sum of rewards
    pub total_reward: f64,
    pub steps: usize,
    /// Episode ended by truncation rather than a terminal state
    pub truncated: bool,
}

/// Hooks called by the trainer. Every hook defaults to doing nothing.
///
/// Call order is `on_training_start`, then `on_episode_end` once per episode,
/// then `on_training_end`. An error from any hook aborts the run.
pub trait TrainingObserver {
    fn on_training_start(&mut self, _method: TdMethod, _episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _method: TdMethod, _q: &QTable) -> Result<()> {
        Ok(())
    }
}

/// Observer that ignores everything.
impl TrainingObserver for () {}

/// Logs a progress line every `every` episodes.
pub struct LoggingObserver {
    every: usize,
    method: Option<TdMethod>,
    window: VecDeque<f64>,
}

impl LoggingObserver {
    pub fn new(every: usize) -> Self {
        let every = every.max(1);
        LoggingObserver { every, method: None, window: VecDeque::with_capacity(every) }
    }

    /// Mean reward over the last `every` episodes.
    pub fn mean_reward(&self) -> Option<f64> {
        if self.window.is_empty() {
            None
        } else {
            Some(self.window.iter().mean())
        }
    }
}

impl TrainingObserver for LoggingObserver {
    fn on_training_start(&mut self, method: TdMethod, episodes: usize) -> Result<()> {
        self.method = Some(method);
        self.window.clear();
        info!(%method, episodes, "Training started.");
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if self.window.len() == self.every {
            self.window.pop_front();
        }
        self.window.push_back(summary.total_reward);
        if summary.episode % self.every == 0 {
            let method = self.method.map(|m| m.to_string()).unwrap_or_default();
            info!(
                method = %method,
                episode = summary.episode,
                reward = summary.total_reward,
                eps = summary.epsilon,
                mean_reward = self.mean_reward().unwrap_or_default(),
                "Episode: {}, Reward: {}, Eps: {:.4}",
                summary.episode, summary.total_reward, summary.epsilon
            );
        }
        Ok(())
    }

    fn on_training_end(&mut self, method: TdMethod, q: &QTable) -> Result<()> {
        info!(%method, n_states = q.n_states(), n_actions = q.n_actions(), "Training finished.");
        Ok(())
    }
}

#[derive(Serialize)]
struct EpisodeRecord<'a> {
    method: &'a str,
    episode: usize,
    epsilon: f64,
    total_reward: f64,
    steps: usize,
    truncated: bool,
}

/// Writes one CSV row per episode.
pub struct CsvObserver<W: Write> {
    writer: csv::Writer<W>,
    method: String,
}

impl<W: Write> CsvObserver<W> {
    pub fn new(writer: W) -> Self {
        CsvObserver { writer: csv::Writer::from_writer(writer), method: String::new() }
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()).into())
    }
}

impl<W: Write> TrainingObserver for CsvObserver<W> {
    fn on_training_start(&mut self, method: TdMethod, _episodes: usize) -> Result<()> {
        self.method = method.to_string();
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.writer.serialize(EpisodeRecord {
            method: &self.method,
            episode: summary.episode,
            epsilon: summary.epsilon,
            total_reward: summary.total_reward,
            steps: summary.steps,
            truncated: summary.truncated,
        })?;
        Ok(())
    }

    fn on_training_end(&mut self, _method: TdMethod, _q: &QTable) -> Result<()> {
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Fans every event out to a list of observers, in order.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Box<dyn TrainingObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Observers::default()
    }

    pub fn with(mut self, observer: impl TrainingObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl TrainingObserver for Observers {
    fn on_training_start(&mut self, method: TdMethod, episodes: usize) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_training_start(method, episodes)?;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_end(summary)?;
        }
        Ok(())
    }

    fn on_training_end(&mut self, method: TdMethod, q: &QTable) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_training_end(method, q)?;
        }
        Ok(())
    }
}
