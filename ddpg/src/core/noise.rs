//! Ornstein-Uhlenbeck exploration noise.
//!
//! Discretized mean-reverting process:
//! ```text
//! x_{t+1} = x_t + θ (μ - x_t) dt + σ √dt N(0, I)
//! ```
//! Successive samples are correlated, so perturbations applied to joint
//! torques change smoothly instead of jumping every step. Call `reset` at the
//! start of every episode so noise never carries across rollouts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Configuration for the Ornstein-Uhlenbeck process.
#[derive(Debug, Clone, PartialEq)]
pub struct OrnsteinUhlenbeckConfig {
    /// Long-run mean μ, one entry per action dimension.
    pub mean: Vec<f32>,
    /// Volatility σ, one entry per action dimension.
    pub std_dev: Vec<f32>,
    /// Mean reversion rate θ.
    pub theta: f32,
    /// Time step.
    pub dt: f32,
    /// State after `reset`. None = zeros.
    pub x_start: Option<Vec<f32>>,
}

impl OrnsteinUhlenbeckConfig {
    /// Zero-mean process with the same volatility on every dimension.
    pub fn new(action_dim: usize, std_dev: f32) -> Self {
        Self {
            mean: vec![0.0; action_dim],
            std_dev: vec![std_dev; action_dim],
            theta: 0.15,
            dt: 0.01,
            x_start: None,
        }
    }

    pub fn with_theta(mut self, theta: f32) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_mean(mut self, mean: Vec<f32>) -> Self {
        self.mean = mean;
        self
    }

    pub fn with_x_start(mut self, x_start: Vec<f32>) -> Self {
        self.x_start = Some(x_start);
        self
    }

    /// Build the process with OS-seeded randomness.
    pub fn init(self) -> OrnsteinUhlenbeckNoise {
        OrnsteinUhlenbeckNoise::new(self, StdRng::from_os_rng())
    }

    /// Build the process with a fixed seed.
    pub fn init_with_seed(self, seed: u64) -> OrnsteinUhlenbeckNoise {
        OrnsteinUhlenbeckNoise::new(self, StdRng::seed_from_u64(seed))
    }
}

/// Stateful Ornstein-Uhlenbeck process.
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeckNoise {
    config: OrnsteinUhlenbeckConfig,
    x_prior: Vec<f32>,
    rng: StdRng,
}

impl OrnsteinUhlenbeckNoise {
    fn new(config: OrnsteinUhlenbeckConfig, rng: StdRng) -> Self {
        assert_eq!(config.mean.len(), config.std_dev.len(), "mean and std_dev dimensions");
        if let Some(start) = &config.x_start {
            assert_eq!(start.len(), config.mean.len(), "x_start dimension");
        }
        let x_prior = Self::start_state(&config);
        Self { config, x_prior, rng }
    }

    fn start_state(config: &OrnsteinUhlenbeckConfig) -> Vec<f32> {
        config
            .x_start
            .clone()
            .unwrap_or_else(|| vec![0.0; config.mean.len()])
    }

    /// Advance the process one step and return the new perturbation.
    pub fn sample(&mut self) -> Vec<f32> {
        let OrnsteinUhlenbeckConfig {
            mean,
            std_dev,
            theta,
            dt,
            ..
        } = &self.config;
        let sqrt_dt = dt.sqrt();

        for ((x, &mu), &sigma) in self.x_prior.iter_mut().zip(mean).zip(std_dev) {
            let z: f32 = self.rng.sample(StandardNormal);
            *x = *x + theta * (mu - *x) * dt + sigma * sqrt_dt * z;
        }
        self.x_prior.clone()
    }

    /// Return to the start state (zeros unless `x_start` was configured).
    pub fn reset(&mut self) {
        self.x_prior = Self::start_state(&self.config);
    }

    /// Current perturbation without advancing.
    pub fn state(&self) -> &[f32] {
        &self.x_prior
    }

    pub fn dim(&self) -> usize {
        self.x_prior.len()
    }

    pub fn config(&self) -> &OrnsteinUhlenbeckConfig {
        &self.config
    }
}
