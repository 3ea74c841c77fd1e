//! Core types shared by the agent and the training loop.

pub mod episode_state;
pub mod noise;
pub mod phase;
pub mod target_network;
pub mod transition;

pub use episode_state::EpisodeState;
pub use noise::{OrnsteinUhlenbeckConfig, OrnsteinUhlenbeckNoise};
pub use phase::Phase;
pub use target_network::{hard_copy, soft_update};
pub use transition::Transition;
