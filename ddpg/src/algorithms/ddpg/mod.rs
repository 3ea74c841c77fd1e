//! DDPG (Deep Deterministic Policy Gradient).
//!
//! Off-policy actor-critic for continuous actions:
//! - Deterministic actor μ(s) trained through the critic's action gradient
//! - Single critic Q(s, a) regressed on bootstrapped TD targets
//! - Slow Polyak-averaged target copies of both networks
//! - Uniform replay over a fixed-capacity ring buffer
//!
//! # Architecture
//!
//! ```text
//! Actor                               Critic
//! ├── LayerNorm(S)                    ├── LayerNorm(S)
//! ├── Linear 400 + LayerNorm + ReLU   ├── Linear 400 + LayerNorm + ReLU
//! ├── Linear 300 + LayerNorm + ReLU   ├── concat(action)
//! └── Linear A + tanh × max_control   ├── Linear 300 + ReLU
//!                                     └── Linear 1
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ddpg::algorithms::ddpg::{DdpgAgent, DdpgConfig, ReplayBuffer};
//!
//! let config = DdpgConfig::hopper();
//! let mut agent = DdpgAgent::<MyBackend>::new(config.clone(), 11, 3, device)?;
//! let mut buffer = ReplayBuffer::new(config.buffer_capacity, 11, 3);
//!
//! let batch = buffer.sample(config.batch_size)?;
//! let stats = agent.update(&batch)?;
//! agent.sync_targets();
//! ```

mod config;
mod ddpg;
mod ddpg_actor;
mod ddpg_buffer;
mod ddpg_critic;

pub use config::DdpgConfig;
pub use ddpg::{ddpg_actor_loss, ddpg_critic_loss, ddpg_td_targets, DdpgAgent, UpdateStats};
pub use ddpg_actor::{Actor, ActorConfig};
pub use ddpg_buffer::{ReplayBatch, ReplayBuffer};
pub use ddpg_critic::{Critic, CriticConfig};

#[cfg(test)]
mod tests;
