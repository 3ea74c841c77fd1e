//! Action-value network Q(s, a).
//!
//! ```text
//! state ─► LayerNorm ─► Linear(400) ─► LayerNorm ─► ReLU ─┐
//!                                                         ├─ concat ─► Linear(300) ─► ReLU ─► Linear(1)
//! action ─────────────────────────────────────────────────┘
//! ```
//!
//! The raw action joins after the first state layer, so the state features
//! are normalized but the action is not.

use burn::module::Module;
use burn::nn::{Initializer, LayerNorm, LayerNormConfig, Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

use super::config::DdpgConfig;

/// Configuration for [`Critic`].
#[derive(Debug, Clone)]
pub struct CriticConfig {
    pub state_dim: usize,
    pub action_dim: usize,
    pub hidden_sizes: [usize; 2],
    pub output_init_range: f64,
}

impl CriticConfig {
    pub fn new(state_dim: usize, action_dim: usize) -> Self {
        Self {
            state_dim,
            action_dim,
            hidden_sizes: [400, 300],
            output_init_range: 0.003,
        }
    }

    pub fn from_ddpg(config: &DdpgConfig, state_dim: usize, action_dim: usize) -> Self {
        Self {
            state_dim,
            action_dim,
            hidden_sizes: config.hidden_sizes,
            output_init_range: config.output_init_range,
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

    pub fn init<B: Backend>(&self, device: &B::Device) -> Critic<B> {
        let [h1, h2] = self.hidden_sizes;

        Critic {
            state_norm: LayerNormConfig::new(self.state_dim).init(device),
            fc1: LinearConfig::new(self.state_dim, h1).init(device),
            norm1: LayerNormConfig::new(h1).init(device),
            fc2: LinearConfig::new(h1 + self.action_dim, h2).init(device),
            output: LinearConfig::new(h2, 1)
                .with_initializer(Initializer::Uniform {
                    min: -self.output_init_range,
                    max: self.output_init_range,
                })
                .init(device),
            state_dim: self.state_dim,
            action_dim: self.action_dim,
        }
    }
}

/// Q-network over state-action pairs.
#[derive(Module, Debug)]
pub struct Critic<B: Backend> {
    state_norm: LayerNorm<B>,
    fc1: Linear<B>,
    norm1: LayerNorm<B>,
    fc2: Linear<B>,
    output: Linear<B>,
    #[module(skip)]
    state_dim: usize,
    #[module(skip)]
    action_dim: usize,
}

impl<B: Backend> Critic<B> {
    /// `[batch, S] x [batch, A] -> [batch, 1]`
    pub fn evaluate(&self, states: Tensor<B, 2>, actions: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.state_norm.forward(states);
        let x = relu(self.norm1.forward(self.fc1.forward(x)));
        let x = Tensor::cat(vec![x, actions], 1);
        let x = relu(self.fc2.forward(x));
        self.output.forward(x)
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }
}
