//! DDPG configuration.
//!
//! Hyperparameters for the agent and the training session, with presets for
//! the Hopper locomotion task and the reference pendulum environment.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DdpgError, Result};

// ============================================================================
// DDPG Configuration
// ============================================================================

/// Configuration for DDPG training.
///
/// Use `DdpgConfig::hopper()` (the default) or `DdpgConfig::pendulum()` for presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdpgConfig {
    // ========================================================================
    // Replay Buffer Settings
    // ========================================================================
    /// Maximum transitions to store in the replay buffer.
    pub buffer_capacity: usize,

    /// Mini-batch size for each learning update.
    pub batch_size: usize,

    // ========================================================================
    // Algorithm Hyperparameters
    // ========================================================================
    /// Discount factor for bootstrapped returns.
    pub discount: f32,

    /// Polyak averaging rate for target networks.
    pub polyak_rate: f32,

    /// Critic learning rate.
    pub critic_lr: f64,

    /// Actor learning rate. Kept below the critic's.
    pub actor_lr: f64,

    /// Gradient norm clipping for both optimizers. None = no clipping.
    pub max_grad_norm: Option<f32>,

    /// Zero the bootstrap term of the TD-target on terminal transitions.
    pub mask_terminal_bootstrap: bool,

    // ========================================================================
    // Network Settings
    // ========================================================================
    /// Hidden layer widths `[first, second]`.
    pub hidden_sizes: [usize; 2],

    /// Output layer weights are drawn from `U(-r, r)`.
    pub output_init_range: f64,

    /// Multiplier applied to the actor's tanh output.
    pub max_control_signal: f32,

    // ========================================================================
    // Exploration Settings
    // ========================================================================
    /// Ornstein-Uhlenbeck mean reversion rate.
    pub noise_theta: f32,

    /// Ornstein-Uhlenbeck volatility.
    pub noise_std_dev: f32,

    /// Ornstein-Uhlenbeck time step.
    pub noise_dt: f32,

    /// Lower bound of every action component.
    pub action_low: f32,

    /// Upper bound of every action component.
    pub action_high: f32,

    // ========================================================================
    // Schedule Settings
    // ========================================================================
    /// Steps of uniform random actions before the policy takes over.
    pub warmup_steps: usize,

    /// No learning update happens at or before this global step.
    pub learning_starts: usize,

    /// Environment steps between learning bursts.
    pub train_every: usize,

    /// Learning updates (each followed by a target sync) per burst.
    pub updates_per_train: usize,

    /// Run learning bursts while actions are still uniform random.
    pub learn_during_warmup: bool,

    /// Reward stored for terminal transitions. None keeps the env reward.
    pub terminal_penalty: Option<f32>,

    // ========================================================================
    // Session Settings
    // ========================================================================
    /// Stop after this many environment steps. None = run until interrupted.
    pub max_total_steps: Option<usize>,

    /// Call `Environment::render` every step.
    pub render: bool,

    /// Seed for buffer sampling, noise and warm-up actions.
    pub seed: Option<u64>,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        Self::hopper()
    }
}

impl DdpgConfig {
    /// Settings for the Hopper task (11-dim state, 3 joints).
    pub fn hopper() -> Self {
        Self {
            buffer_capacity: 1_000_000,
            batch_size: 100,

            discount: 0.99,
            polyak_rate: 0.001,
            critic_lr: 1e-3,
            actor_lr: 1e-4,
            max_grad_norm: None,
            mask_terminal_bootstrap: true,

            hidden_sizes: [400, 300],
            output_init_range: 0.003,
            max_control_signal: 1.0,

            noise_theta: 0.15,
            noise_std_dev: 0.2,
            noise_dt: 0.01,
            action_low: -1.0,
            action_high: 1.0,

            warmup_steps: 10_000,
            learning_starts: 1000,
            train_every: 50,
            updates_per_train: 50,
            learn_during_warmup: true,
            terminal_penalty: Some(-10.0),

            max_total_steps: None,
            render: false,
            seed: None,
        }
    }

    /// Settings for the reference pendulum environment.
    ///
    /// The pendulum never terminates, so there is no penalty, and it needs
    /// far fewer warm-up steps.
    pub fn pendulum() -> Self {
        Self {
            buffer_capacity: 100_000,
            batch_size: 64,
            polyak_rate: 0.005,
            hidden_sizes: [64, 64],
            warmup_steps: 2000,
            learning_starts: 1000,
            train_every: 50,
            updates_per_train: 50,
            terminal_penalty: None,
            ..Self::hopper()
        }
    }

    /// Builder pattern: set buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Builder pattern: set batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder pattern: set discount.
    pub fn with_discount(mut self, discount: f32) -> Self {
        self.discount = discount;
        self
    }

    /// Builder pattern: set Polyak rate.
    pub fn with_polyak_rate(mut self, polyak_rate: f32) -> Self {
        self.polyak_rate = polyak_rate;
        self
    }

    /// Builder pattern: set learning rates.
    pub fn with_learning_rates(mut self, actor_lr: f64, critic_lr: f64) -> Self {
        self.actor_lr = actor_lr;
        self.critic_lr = critic_lr;
        self
    }

    /// Builder pattern: set gradient clipping.
    pub fn with_max_grad_norm(mut self, max_grad_norm: Option<f32>) -> Self {
        self.max_grad_norm = max_grad_norm;
        self
    }

    /// Builder pattern: enable or disable terminal masking.
    pub fn with_terminal_masking(mut self, mask: bool) -> Self {
        self.mask_terminal_bootstrap = mask;
        self
    }

    /// Builder pattern: set hidden layer sizes.
    pub fn with_hidden_sizes(mut self, first: usize, second: usize) -> Self {
        self.hidden_sizes = [first, second];
        self
    }

    /// Builder pattern: set the actor output multiplier.
    pub fn with_max_control_signal(mut self, max_control_signal: f32) -> Self {
        self.max_control_signal = max_control_signal;
        self
    }

    /// Builder pattern: set exploration noise parameters.
    pub fn with_noise(mut self, theta: f32, std_dev: f32, dt: f32) -> Self {
        self.noise_theta = theta;
        self.noise_std_dev = std_dev;
        self.noise_dt = dt;
        self
    }

    /// Builder pattern: set action bounds.
    pub fn with_action_bounds(mut self, low: f32, high: f32) -> Self {
        self.action_low = low;
        self.action_high = high;
        self
    }

    /// Builder pattern: set the warm-up length.
    pub fn with_warmup_steps(mut self, steps: usize) -> Self {
        self.warmup_steps = steps;
        self
    }

    /// Builder pattern: set the learning cadence.
    pub fn with_train_schedule(
        mut self,
        learning_starts: usize,
        train_every: usize,
        updates_per_train: usize,
    ) -> Self {
        self.learning_starts = learning_starts;
        self.train_every = train_every;
        self.updates_per_train = updates_per_train;
        self
    }

    /// Builder pattern: allow or forbid learning before the warm-up ends.
    pub fn with_learn_during_warmup(mut self, learn: bool) -> Self {
        self.learn_during_warmup = learn;
        self
    }

    /// Builder pattern: set the terminal penalty.
    pub fn with_terminal_penalty(mut self, penalty: Option<f32>) -> Self {
        self.terminal_penalty = penalty;
        self
    }

    /// Builder pattern: set the step limit.
    pub fn with_max_total_steps(mut self, steps: Option<usize>) -> Self {
        self.max_total_steps = steps;
        self
    }

    /// Builder pattern: enable rendering.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Builder pattern: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("discount", self.discount),
            ("polyak_rate", self.polyak_rate),
            ("max_control_signal", self.max_control_signal),
            ("noise_theta", self.noise_theta),
            ("noise_std_dev", self.noise_std_dev),
            ("noise_dt", self.noise_dt),
            ("action_low", self.action_low),
            ("action_high", self.action_high),
        ];
        if let Some((param, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DdpgError::invalid_config(*param, "must be finite"));
        }
        let doubles = [
            ("critic_lr", self.critic_lr),
            ("actor_lr", self.actor_lr),
            ("output_init_range", self.output_init_range),
        ];
        if let Some((param, _)) = doubles.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DdpgError::invalid_config(*param, "must be finite"));
        }
        if self.terminal_penalty.is_some_and(|p| !p.is_finite()) {
            return Err(DdpgError::invalid_config("terminal_penalty", "must be finite"));
        }
        if self.buffer_capacity == 0 {
            return Err(DdpgError::invalid_config("buffer_capacity", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(DdpgError::invalid_config("batch_size", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(DdpgError::invalid_config("discount", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.polyak_rate) {
            return Err(DdpgError::invalid_config("polyak_rate", "must be in [0, 1]"));
        }
        if self.critic_lr <= 0.0 {
            return Err(DdpgError::invalid_config("critic_lr", "must be positive"));
        }
        if self.actor_lr <= 0.0 {
            return Err(DdpgError::invalid_config("actor_lr", "must be positive"));
        }
        if let Some(norm) = self.max_grad_norm {
            if norm <= 0.0 {
                return Err(DdpgError::invalid_config("max_grad_norm", "must be positive"));
            }
        }
        if self.hidden_sizes.iter().any(|&h| h == 0) {
            return Err(DdpgError::invalid_config("hidden_sizes", "layers must be non-empty"));
        }
        if self.output_init_range < 0.0 {
            return Err(DdpgError::invalid_config("output_init_range", "must be non-negative"));
        }
        if self.max_control_signal <= 0.0 {
            return Err(DdpgError::invalid_config("max_control_signal", "must be positive"));
        }
        if self.noise_theta < 0.0 || self.noise_std_dev < 0.0 {
            return Err(DdpgError::invalid_config("noise", "theta and std_dev must be non-negative"));
        }
        if self.noise_dt <= 0.0 {
            return Err(DdpgError::invalid_config("noise_dt", "must be positive"));
        }
        if self.action_low >= self.action_high {
            return Err(DdpgError::invalid_config(
                "action_low",
                format!("{} is not below action_high {}", self.action_low, self.action_high),
            ));
        }
        if self.train_every == 0 {
            return Err(DdpgError::invalid_config("train_every", "must be at least 1"));
        }
        Ok(())
    }

    /// Load a config from a JSON file. Missing fields take Hopper defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}
