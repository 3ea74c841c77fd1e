//! DDPG trainer binary.
//!
//! Trains on the pendulum swing-up task until the step limit is reached or
//! Ctrl-C is pressed. Interrupts take effect at the end of the current
//! episode; the reward chart is then printed and the history written to CSV.
//!
//! Usage:
//! ```text
//! ddpg-trainer --preset pendulum --steps 50000 --seed 7
//! ddpg-trainer --config my_config.json --log-format json
//! ```

use std::path::PathBuf;

use burn::backend::{Autodiff, NdArray};
use clap::{Parser, ValueEnum};

use ddpg::error::BoxedError;
use ddpg::{
    init_logging, Checkpointer, CheckpointerConfig, ConsoleLogger, CsvLogger, DdpgConfig,
    LogFormat, LoggingConfig, MultiLogger, PendulumEnv, RewardHistory, StopHandle,
    TrainingSession,
};

type Backend = Autodiff<NdArray<f32>>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Hopper hyperparameters (400/300 networks, 10k warm-up, -10 fall penalty)
    Hopper,
    /// Smaller networks and shorter warm-up
    Pendulum,
}

#[derive(Debug, Parser)]
#[command(name = "ddpg-trainer", about = "Train a DDPG agent on a continuous-control task")]
struct Cli {
    /// Hyperparameter preset, ignored when --config is given
    #[arg(long, value_enum, default_value_t = Preset::Pendulum)]
    preset: Preset,

    /// JSON config file (missing fields take Hopper defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config to this path before training
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Stop after this many environment steps
    #[arg(long)]
    steps: Option<usize>,

    /// RNG seed for the buffer, noise, warm-up actions and environment
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for actor/critic checkpoints
    #[arg(long, default_value = "networks")]
    checkpoint_dir: PathBuf,

    /// Disable checkpointing
    #[arg(long)]
    no_checkpoint: bool,

    /// Per-episode CSV log
    #[arg(long)]
    episode_csv: Option<PathBuf>,

    /// Reward history written on exit
    #[arg(long, default_value = "rewards.csv")]
    rewards_csv: PathBuf,

    /// Act greedily (the noise process still runs)
    #[arg(long)]
    no_exploration: bool,

    /// Render the environment every step
    #[arg(long)]
    render: bool,

    /// Episodes between console summaries
    #[arg(long, default_value_t = 10)]
    log_interval: usize,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// pretty, compact or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    /// Also write JSON logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default()
        .with_level(cli.log_level.clone())
        .with_format(cli.log_format);
    if let Some(path) = &cli.log_file {
        logging = logging.with_log_file(path);
    }
    init_logging(&logging)?;

    let config = build_config(&cli)?;
    if let Some(path) = &cli.save_config {
        config.to_json_file(path)?;
    }
    tracing::info!(?config, "configuration");

    let stop = StopHandle::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current episode");
            signal_stop.stop();
        }
    });

    let rewards_csv = cli.rewards_csv.clone();
    let history = tokio::task::spawn_blocking(move || train(cli, config, stop)).await??;

    print!("{}", history.render_ascii(60, 12));
    history.write_csv(&rewards_csv)?;
    tracing::info!(
        episodes = history.len(),
        best = history.best().unwrap_or_default(),
        path = %rewards_csv.display(),
        "reward history written"
    );
    Ok(())
}

fn build_config(cli: &Cli) -> ddpg::Result<DdpgConfig> {
    let mut config = match &cli.config {
        Some(path) => DdpgConfig::from_json_file(path)?,
        None => match cli.preset {
            Preset::Hopper => DdpgConfig::hopper(),
            Preset::Pendulum => DdpgConfig::pendulum(),
        },
    };
    if cli.steps.is_some() {
        config = config.with_max_total_steps(cli.steps);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.render {
        config = config.with_render(true);
    }
    config.validate()?;
    Ok(config)
}

fn train(cli: Cli, config: DdpgConfig, stop: StopHandle) -> ddpg::Result<RewardHistory> {
    let env = match config.seed {
        Some(seed) => PendulumEnv::with_seed(seed),
        None => PendulumEnv::new(),
    };

    let mut logger = MultiLogger::new().add(ConsoleLogger::new(cli.log_interval));
    if let Some(path) = &cli.episode_csv {
        logger = logger.add(CsvLogger::new(path)?);
    }

    let mut session = TrainingSession::<Backend, _>::new(config, env, Default::default())?
        .with_logger(logger)
        .with_stop_handle(stop);
    if !cli.no_checkpoint {
        let checkpointer = Checkpointer::new(CheckpointerConfig::new(&cli.checkpoint_dir))?;
        session = session.with_checkpointer(checkpointer);
    }
    session.set_exploration(!cli.no_exploration);

    session.run()?;
    Ok(session.reward_history().clone())
}
