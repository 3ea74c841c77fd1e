//! # DDPG: Deep Deterministic Policy Gradient on burn
//!
//! Off-policy actor-critic training for continuous control with uniform
//! experience replay, Ornstein-Uhlenbeck exploration and Polyak-averaged
//! target networks.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      TrainingSession                          │
//! │                                                               │
//! │   state ──► Actor μ(s) ──► + OU noise ──► clip ──► Environment │
//! │                                                      │        │
//! │                                          (s, a, r, s', d)     │
//! │                                                      ▼        │
//! │                                              ReplayBuffer     │
//! │                                                      │        │
//! │              every train_every steps: sample batch   │        │
//! │                                                      ▼        │
//! │   DdpgAgent::update ── critic MSE step, actor DPG step        │
//! │   DdpgAgent::sync_targets ── θ' ← τθ + (1 - τ)θ'              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::{Autodiff, NdArray};
//! use ddpg::{DdpgConfig, PendulumEnv, TrainingSession};
//!
//! type B = Autodiff<NdArray<f32>>;
//!
//! let config = DdpgConfig::pendulum().with_max_total_steps(Some(50_000));
//! let mut session = TrainingSession::<B, _>::new(config, PendulumEnv::new(), Default::default())?;
//! session.run()?;
//! print!("{}", session.reward_history().render_ascii(60, 12));
//! ```

pub mod algorithms;
pub mod checkpoint;
pub mod core;
pub mod environment;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod runners;

// Re-export commonly used types
pub use algorithms::ddpg::{
    ddpg_actor_loss, ddpg_critic_loss, ddpg_td_targets, Actor, ActorConfig, Critic, CriticConfig,
    DdpgAgent, DdpgConfig, ReplayBatch, ReplayBuffer, UpdateStats,
};
pub use checkpoint::{Checkpointer, CheckpointerConfig};
pub use crate::core::{
    hard_copy, soft_update, EpisodeState, OrnsteinUhlenbeckConfig, OrnsteinUhlenbeckNoise, Phase,
    Transition,
};
pub use environment::{Environment, PendulumEnv, PendulumError, StepOutcome};
pub use error::{DdpgError, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{ConsoleLogger, CsvLogger, EpisodeSnapshot, MetricsLogger, MultiLogger, RewardHistory};
pub use runners::{StepReport, StopHandle, TrainingSession};
