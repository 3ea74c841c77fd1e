//! Learning algorithms.
//!
//! - `ddpg`: Deep Deterministic Policy Gradient with uniform replay

pub mod ddpg;

pub use ddpg::{DdpgAgent, DdpgConfig, ReplayBatch, ReplayBuffer, UpdateStats};
