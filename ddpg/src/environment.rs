//! Environment abstraction for single-agent continuous control.
//!
//! The training loop only needs `reset`, `step` and an optional `render`.
//! A small inverted-pendulum task is included so the trainer binary and the
//! tests have a concrete environment to drive.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::core::episode_state::EpisodeState;

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Observation after the step [state_dim].
    pub next_state: Vec<f32>,
    /// Raw environment reward.
    pub reward: f32,
    /// Episode ended in an absorbing state (e.g. the robot fell).
    pub terminated: bool,
    /// Episode ended due to a time limit.
    pub truncated: bool,
}

impl StepOutcome {
    pub fn new(next_state: Vec<f32>, reward: f32, terminated: bool, truncated: bool) -> Self {
        Self {
            next_state,
            reward,
            terminated,
            truncated,
        }
    }

    /// Terminal OR truncated.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }

    pub fn episode_state(&self) -> EpisodeState {
        EpisodeState::from_flags(self.terminated, self.truncated)
    }
}

/// Single continuous-control environment.
///
/// Errors are opaque to the trainer; any failure ends the run.
pub trait Environment {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Observation dimension S.
    fn state_dim(&self) -> usize;

    /// Action dimension A.
    fn action_dim(&self) -> usize;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Vec<f32>, Self::Error>;

    /// Apply `action` and advance one step.
    fn step(&mut self, action: &[f32]) -> Result<StepOutcome, Self::Error>;

    /// Side-effecting visualization. No-op by default.
    fn render(&mut self) {}
}

// ============================================================================
// Pendulum
// ============================================================================

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;
const MAX_STEPS: usize = 200;

#[derive(Error, Debug, PartialEq)]
pub enum PendulumError {
    #[error("expected a single torque value, got {0} values")]
    ActionDimension(usize),
    #[error("step called before reset")]
    NotReset,
}

/// Inverted pendulum swing-up.
///
/// Observation `[cos θ, sin θ, θ̇]`, action in `[-1, 1]` scaled to
/// `[-2, 2]` torque. Reward is `-(θ² + 0.1 θ̇² + 0.001 u²)`. Never terminates;
/// truncates after `max_steps`.
#[derive(Debug, Clone)]
pub struct PendulumEnv {
    theta: f32,
    theta_dot: f32,
    ticks: usize,
    max_steps: usize,
    started: bool,
    rng: StdRng,
}

impl PendulumEnv {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            theta: 0.0,
            theta_dot: 0.0,
            ticks: 0,
            max_steps: MAX_STEPS,
            started: false,
            rng,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }

    /// Current `(θ, θ̇)`.
    pub fn physical_state(&self) -> (f32, f32) {
        (self.theta, self.theta_dot)
    }
}

impl Default for PendulumEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for PendulumEnv {
    type Error = PendulumError;

    fn state_dim(&self) -> usize {
        3
    }

    fn action_dim(&self) -> usize {
        1
    }

    fn reset(&mut self) -> Result<Vec<f32>, PendulumError> {
        let pi = std::f32::consts::PI;
        self.theta = self.rng.random_range(-pi..pi);
        self.theta_dot = self.rng.random_range(-1.0..1.0);
        self.ticks = 0;
        self.started = true;
        Ok(self.observation())
    }

    fn step(&mut self, action: &[f32]) -> Result<StepOutcome, PendulumError> {
        if !self.started {
            return Err(PendulumError::NotReset);
        }
        let [u] = action else {
            return Err(PendulumError::ActionDimension(action.len()));
        };

        let torque = (u * MAX_TORQUE).clamp(-MAX_TORQUE, MAX_TORQUE);
        let (theta, theta_dot) = (self.theta, self.theta_dot);

        let cost = theta * theta + 0.1 * theta_dot * theta_dot + 0.001 * torque * torque;

        let new_theta_dot = theta_dot + (3.0 * G / (2.0 * L) * theta.sin() + 3.0 / (M * L * L) * torque) * DT;
        let new_theta_dot = new_theta_dot.clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = angle_normalize(theta + new_theta_dot * DT);
        self.theta_dot = new_theta_dot;

        self.ticks += 1;
        let truncated = self.ticks >= self.max_steps;

        Ok(StepOutcome::new(self.observation(), -cost, false, truncated))
    }

    fn render(&mut self) {
        tracing::trace!(theta = self.theta, theta_dot = self.theta_dot, tick = self.ticks, "pendulum");
    }
}

/// Wrap an angle into `[-π, π)`.
fn angle_normalize(angle: f32) -> f32 {
    let pi = std::f32::consts::PI;
    let two_pi = 2.0 * pi;
    ((angle + pi) % two_pi + two_pi) % two_pi - pi
}
