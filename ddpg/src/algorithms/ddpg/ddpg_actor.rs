//! Deterministic policy network μ(s).
//!
//! ```text
//! state ─► LayerNorm ─► Linear(400) ─► LayerNorm ─► ReLU
//!                   ─► Linear(300) ─► LayerNorm ─► ReLU
//!                   ─► Linear(A) ─► tanh ─► × max_control_signal
//! ```
//!
//! The output layer is drawn from `U(-0.003, 0.003)` so initial actions sit
//! near zero.

use burn::module::Module;
use burn::nn::{Initializer, LayerNorm, LayerNormConfig, Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{relu, tanh};

use super::config::DdpgConfig;

/// Configuration for [`Actor`].
#[derive(Debug, Clone)]
pub struct ActorConfig {
    /// State dimension S.
    pub state_dim: usize,
    /// Action dimension A.
    pub action_dim: usize,
    /// Widths of the two hidden layers.
    pub hidden_sizes: [usize; 2],
    /// Half-width of the uniform range for the output layer.
    pub output_init_range: f64,
    /// Multiplier applied after tanh.
    pub max_control_signal: f32,
}

impl ActorConfig {
    pub fn new(state_dim: usize, action_dim: usize) -> Self {
        Self {
            state_dim,
            action_dim,
            hidden_sizes: [400, 300],
            output_init_range: 0.003,
            max_control_signal: 1.0,
        }
    }

    /// Network shape and scaling taken from an agent configuration.
    pub fn from_ddpg(config: &DdpgConfig, state_dim: usize, action_dim: usize) -> Self {
        Self {
            state_dim,
            action_dim,
            hidden_sizes: config.hidden_sizes,
            output_init_range: config.output_init_range,
            max_control_signal: config.max_control_signal,
        }
    }

    pub fn with_hidden_sizes(mut self, first: usize, second: usize) -> Self {
        self.hidden_sizes = [first, second];
        self
    }

    pub fn with_output_init_range(mut self, range: f64) -> Self {
        self.output_init_range = range;
        self
    }

    pub fn with_max_control_signal(mut self, max_control_signal: f32) -> Self {
        self.max_control_signal = max_control_signal;
        self
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Actor<B> {
        let [h1, h2] = self.hidden_sizes;
        let output_init = Initializer::Uniform {
            min: -self.output_init_range,
            max: self.output_init_range,
        };

        Actor {
            input_norm: LayerNormConfig::new(self.state_dim).init(device),
            fc1: LinearConfig::new(self.state_dim, h1).init(device),
            norm1: LayerNormConfig::new(h1).init(device),
            fc2: LinearConfig::new(h1, h2).init(device),
            norm2: LayerNormConfig::new(h2).init(device),
            output: LinearConfig::new(h2, self.action_dim)
                .with_initializer(output_init)
                .init(device),
            max_control_signal: self.max_control_signal,
            state_dim: self.state_dim,
            action_dim: self.action_dim,
        }
    }
}

/// Policy network mapping states to actions in `[-max, max]^A`.
#[derive(Module, Debug)]
pub struct Actor<B: Backend> {
    input_norm: LayerNorm<B>,
    fc1: Linear<B>,
    norm1: LayerNorm<B>,
    fc2: Linear<B>,
    norm2: LayerNorm<B>,
    output: Linear<B>,
    #[module(skip)]
    max_control_signal: f32,
    #[module(skip)]
    state_dim: usize,
    #[module(skip)]
    action_dim: usize,
}

impl<B: Backend> Actor<B> {
    /// Forward pass: `[batch, S] -> [batch, A]`.
    pub fn act(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.input_norm.forward(states);
        let x = relu(self.norm1.forward(self.fc1.forward(x)));
        let x = relu(self.norm2.forward(self.fc2.forward(x)));
        tanh(self.output.forward(x)).mul_scalar(self.max_control_signal)
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn max_control_signal(&self) -> f32 {
        self.max_control_signal
    }
}
