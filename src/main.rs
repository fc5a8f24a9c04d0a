use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tdlearn::gym::GymHttpEnv;
use tdlearn::observer::{CsvObserver, LoggingObserver, Observers};
use tdlearn::report::{write_submission, Submission, TrainedAgent};
use tdlearn::trainer::build_rng;
use tdlearn::{mdp, AppConfig, StepLimit, TdMethod, Trainer};


/// Command line argument parser.
#[derive(Parser, Debug)]
#[command(about = "Tabular SARSA and Q-learning homework tools", long_about = None)]
pub struct Args {
    /// Path to TOML configuration file. Built-in defaults are used without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}


#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a zero action-value table for every MDP in a JSON list.
    InitQ {
        /// JSON list of MDP descriptions
        mdps: PathBuf,
        /// Where to write the list of tables
        out: PathBuf,
        /// Check transition probabilities and rewards before writing
        #[arg(long)]
        validate: bool,
    },
    /// Train Q-learning and SARSA against the configured gym environment.
    Train {
        /// Where to write the submission
        out: PathBuf,
        /// Also write per-episode statistics as CSV
        #[arg(long)]
        episodes_csv: Option<PathBuf>,
    },
}


fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = get_config(args.config.as_deref())?;

    match &args.command {
        Commands::InitQ { mdps, out, validate } => init_q(mdps, out, *validate),
        Commands::Train { out, episodes_csv } => train(&config, out, episodes_csv.as_deref()),
    }
}


fn get_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => {
            info!("Reading config file: {}", path.display());
            AppConfig::load(path)
                .with_context(|| format!("Unable to use configuration file {}", path.display()))
        }
        None => Ok(AppConfig::default()),
    }
}


fn init_q(mdps_path: &Path, out: &Path, validate: bool) -> anyhow::Result<()> {
    let mdps = mdp::read_mdps(mdps_path)?;
    info!("Loaded {} MDP descriptions.", mdps.len());
    if validate {
        for (i, description) in mdps.iter().enumerate() {
            description.validate(1e-6).with_context(|| format!("MDP #{i} failed validation"))?;
        }
    }
    let tables = mdp::initialize_all(&mdps);
    mdp::write_action_values(out, &tables)?;
    info!("Wrote {} action-value tables to {}.", tables.len(), out.display());
    Ok(())
}


fn train(config: &AppConfig, out: &Path, episodes_csv: Option<&Path>) -> anyhow::Result<()> {
    let gym = GymHttpEnv::connect(&config.gym.base_url, &config.gym.env_id)
        .with_context(|| format!("Unable to create {} at {}", config.gym.env_id, config.gym.base_url))?;
    let mut gym = match config.training.seed {
        Some(seed) => gym.with_seed(seed),
        None => gym,
    };

    let mut observers = Observers::new().with(LoggingObserver::new(config.training.log_every));
    if let Some(path) = episodes_csv {
        let file = File::create(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        observers = observers.with(CsvObserver::new(file));
    }

    let rng = &mut build_rng(config.training.seed);
    let mut agents = Vec::with_capacity(2);
    for method in [TdMethod::QLearning, TdMethod::Sarsa] {
        let trainer = Trainer::new(method, config.hyperparameters)?;
        let mut env = StepLimit::new(&mut gym, config.training.max_episode_steps);
        let q = trainer.train(&mut env, rng, &mut observers)
            .with_context(|| format!("{method} training aborted"))?;
        agents.push(TrainedAgent::from(q));
    }
    gym.close()?;

    let sarsa = agents.pop().context("missing SARSA agent")?;
    let q_learning = agents.pop().context("missing Q-learning agent")?;
    write_submission(out, &Submission { q_learning, sarsa })?;
    info!("Wrote submission to {}.", out.display());
    Ok(())
}
