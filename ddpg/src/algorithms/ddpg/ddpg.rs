//! DDPG learning update.
//!
//! ```text
//! DDPG Update (one call):
//!
//! 1. TD TARGET (no gradients):
//!    a' = μ_target(s')
//!    y  = r + γ (1 - d) Q_target(s', a')      (d masked only if enabled)
//!
//! 2. CRITIC UPDATE:
//!    L_Q = mean((Q(s, a) - y)²)               Adam, lr 1e-3
//!
//! 3. ACTOR UPDATE (deterministic policy gradient):
//!    L_μ = -mean(Q(s, μ(s)))                  Adam, lr 1e-4
//!
//! 4. TARGET SYNC (caller triggered):
//!    θ' ← ρ θ + (1 - ρ) θ'                   for actor and critic
//! ```

use burn::grad_clipping::GradientClippingConfig;
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;

use super::config::DdpgConfig;
use super::ddpg_actor::{Actor, ActorConfig};
use super::ddpg_buffer::ReplayBatch;
use super::ddpg_critic::{Critic, CriticConfig};
use crate::core::target_network::soft_update;
use crate::error::{DdpgError, Result};

// ============================================================================
// Loss Functions
// ============================================================================

/// Compute TD targets.
///
/// y = r + γ * (1 - done) * Q_target(s', μ_target(s'))
///
/// With `mask_terminal == false` the bootstrap term is kept on every sample
/// and the terminal penalty in `rewards` is the only end-of-episode signal.
///
/// # Arguments
/// - `rewards`: Stored rewards [batch]
/// - `terminals`: 1.0 for absorbing transitions [batch]
/// - `next_q`: Target critic at (s', μ_target(s')) [batch]
/// - `discount`: γ
/// - `mask_terminal`: Zero the bootstrap term on terminal samples
pub fn ddpg_td_targets<B: Backend>(
    rewards: Tensor<B, 1>,
    terminals: Tensor<B, 1>,
    next_q: Tensor<B, 1>,
    discount: f32,
    mask_terminal: bool,
) -> Tensor<B, 1> {
    let bootstrap = if mask_terminal {
        let not_done = terminals.mul_scalar(-1.0).add_scalar(1.0);
        not_done * next_q
    } else {
        next_q
    };
    rewards + bootstrap.mul_scalar(discount)
}

/// Mean squared error between predicted Q-values and TD targets.
pub fn ddpg_critic_loss<B: Backend>(q: Tensor<B, 1>, targets: Tensor<B, 1>) -> Tensor<B, 1> {
    (q - targets).powf_scalar(2.0).mean()
}

/// Actor maximizes Q(s, μ(s)); the loss to minimize is its negated mean.
pub fn ddpg_actor_loss<B: Backend>(q: Tensor<B, 1>) -> Tensor<B, 1> {
    q.mean().neg()
}

// ============================================================================
// Update Statistics
// ============================================================================

/// Scalars from one learning update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateStats {
    pub critic_loss: f32,
    pub actor_loss: f32,
    /// Mean online Q(s, a) over the batch.
    pub mean_q: f32,
}

impl UpdateStats {
    /// Element-wise mean over a burst of updates.
    pub fn mean_of(stats: &[UpdateStats]) -> UpdateStats {
        if stats.is_empty() {
            return UpdateStats::default();
        }
        let n = stats.len() as f32;
        let sum = stats.iter().fold(UpdateStats::default(), |acc, s| UpdateStats {
            critic_loss: acc.critic_loss + s.critic_loss,
            actor_loss: acc.actor_loss + s.actor_loss,
            mean_q: acc.mean_q + s.mean_q,
        });
        UpdateStats {
            critic_loss: sum.critic_loss / n,
            actor_loss: sum.actor_loss / n,
            mean_q: sum.mean_q / n,
        }
    }
}

// ============================================================================
// Agent
// ============================================================================

struct BatchTensors<B: Backend> {
    states: Tensor<B, 2>,
    actions: Tensor<B, 2>,
    rewards: Tensor<B, 1>,
    next_states: Tensor<B, 2>,
    terminals: Tensor<B, 1>,
}

/// Online and target actor/critic pairs with their optimizers.
///
/// Target networks start as exact copies of the online networks and only
/// move through [`DdpgAgent::sync_targets`].
pub struct DdpgAgent<B: AutodiffBackend> {
    actor: Actor<B>,
    critic: Critic<B>,
    target_actor: Actor<B>,
    target_critic: Critic<B>,
    actor_optimizer: OptimizerAdaptor<Adam, Actor<B>, B>,
    critic_optimizer: OptimizerAdaptor<Adam, Critic<B>, B>,
    config: DdpgConfig,
    device: B::Device,
    state_dim: usize,
    action_dim: usize,
    update_count: usize,
}

impl<B: AutodiffBackend> DdpgAgent<B> {
    /// Build fresh networks for a `state_dim -> action_dim` task.
    pub fn new(
        config: DdpgConfig,
        state_dim: usize,
        action_dim: usize,
        device: B::Device,
    ) -> Result<Self> {
        config.validate()?;
        let actor = ActorConfig::from_ddpg(&config, state_dim, action_dim).init(&device);
        let critic = CriticConfig::from_ddpg(&config, state_dim, action_dim).init(&device);
        Ok(Self::from_networks(config, actor, critic, device))
    }

    /// Wrap existing online networks, e.g. loaded from a checkpoint.
    pub fn from_networks(config: DdpgConfig, actor: Actor<B>, critic: Critic<B>, device: B::Device) -> Self {
        let state_dim = actor.state_dim();
        let action_dim = actor.action_dim();

        let actor_optimizer = adam(config.max_grad_norm).init();
        let critic_optimizer = adam(config.max_grad_norm).init();

        Self {
            target_actor: actor.clone(),
            target_critic: critic.clone(),
            actor,
            critic,
            actor_optimizer,
            critic_optimizer,
            config,
            device,
            state_dim,
            action_dim,
            update_count: 0,
        }
    }

    /// Deterministic action μ(s) for a single state. No noise, no clipping.
    pub fn act(&self, state: &[f32]) -> Result<Vec<f32>> {
        if state.len() != self.state_dim {
            return Err(DdpgError::ShapeMismatch {
                what: "state",
                expected: self.state_dim,
                actual: state.len(),
            });
        }
        let actor = self.actor.valid();
        let input = Tensor::<B::InnerBackend, 2>::from_data(
            TensorData::new(state.to_vec(), [1, self.state_dim]),
            &self.device,
        );
        actor
            .act(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| DdpgError::Tensor(format!("{:?}", e)))
    }

    /// One critic step followed by one actor step on `batch`.
    ///
    /// Does not touch the target networks; call [`Self::sync_targets`].
    pub fn update(&mut self, batch: &ReplayBatch) -> Result<UpdateStats> {
        let n = batch.batch_size;
        let t = self.batch_tensors(batch)?;

        // Critic
        let next_actions = self.target_actor.act(t.next_states.clone());
        let next_q: Tensor<B, 1> = self.target_critic.evaluate(t.next_states, next_actions).reshape([n]);
        let targets = ddpg_td_targets(
            t.rewards,
            t.terminals,
            next_q,
            self.config.discount,
            self.config.mask_terminal_bootstrap,
        )
        .detach();

        let q: Tensor<B, 1> = self.critic.evaluate(t.states.clone(), t.actions).reshape([n]);
        let mean_q: f32 = q.clone().detach().mean().into_scalar().elem();
        let critic_loss = ddpg_critic_loss(q, targets);
        let critic_loss_val: f32 = critic_loss.clone().into_scalar().elem();

        let grads = critic_loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.critic);
        self.critic = self
            .critic_optimizer
            .step(self.config.critic_lr, self.critic.clone(), grads);

        // Actor, through the freshly updated critic
        let policy_actions = self.actor.act(t.states.clone());
        let policy_q: Tensor<B, 1> = self.critic.evaluate(t.states, policy_actions).reshape([n]);
        let actor_loss = ddpg_actor_loss(policy_q);
        let actor_loss_val: f32 = actor_loss.clone().into_scalar().elem();

        let grads = actor_loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.actor);
        self.actor = self
            .actor_optimizer
            .step(self.config.actor_lr, self.actor.clone(), grads);

        self.update_count += 1;

        Ok(UpdateStats {
            critic_loss: critic_loss_val,
            actor_loss: actor_loss_val,
            mean_q,
        })
    }

    /// Polyak-average both target networks toward their online networks.
    pub fn sync_targets(&mut self) {
        let rate = self.config.polyak_rate;
        self.target_actor = soft_update(&self.actor, self.target_actor.clone(), rate);
        self.target_critic = soft_update(&self.critic, self.target_critic.clone(), rate);
    }

    /// Critic loss on `batch` without updating anything.
    pub fn critic_loss(&self, batch: &ReplayBatch) -> Result<f32> {
        let n = batch.batch_size;
        let t = self.batch_tensors(batch)?;

        let next_actions = self.target_actor.act(t.next_states.clone());
        let next_q: Tensor<B, 1> = self.target_critic.evaluate(t.next_states, next_actions).reshape([n]);
        let targets = ddpg_td_targets(
            t.rewards,
            t.terminals,
            next_q,
            self.config.discount,
            self.config.mask_terminal_bootstrap,
        );
        let q: Tensor<B, 1> = self.critic.evaluate(t.states, t.actions).reshape([n]);
        Ok(ddpg_critic_loss(q, targets).detach().into_scalar().elem())
    }

    /// Online Q(s, a) for every sample in `batch`.
    pub fn q_values(&self, batch: &ReplayBatch) -> Result<Vec<f32>> {
        let n = batch.batch_size;
        let t = self.batch_tensors(batch)?;
        let q: Tensor<B, 1> = self.critic.evaluate(t.states, t.actions).reshape([n]);
        q.detach()
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| DdpgError::Tensor(format!("{:?}", e)))
    }

    /// Replace the online networks and reset targets to match them.
    pub fn load_networks(&mut self, actor: Actor<B>, critic: Critic<B>) -> Result<()> {
        if actor.state_dim() != self.state_dim || actor.action_dim() != self.action_dim {
            return Err(DdpgError::ShapeMismatch {
                what: "actor",
                expected: self.state_dim,
                actual: actor.state_dim(),
            });
        }
        if critic.state_dim() != self.state_dim || critic.action_dim() != self.action_dim {
            return Err(DdpgError::ShapeMismatch {
                what: "critic",
                expected: self.state_dim,
                actual: critic.state_dim(),
            });
        }
        self.target_actor = actor.clone();
        self.target_critic = critic.clone();
        self.actor = actor;
        self.critic = critic;
        Ok(())
    }

    fn batch_tensors(&self, batch: &ReplayBatch) -> Result<BatchTensors<B>> {
        batch.validate()?;
        if batch.state_dim != self.state_dim {
            return Err(DdpgError::ShapeMismatch {
                what: "batch state_dim",
                expected: self.state_dim,
                actual: batch.state_dim,
            });
        }
        if batch.action_dim != self.action_dim {
            return Err(DdpgError::ShapeMismatch {
                what: "batch action_dim",
                expected: self.action_dim,
                actual: batch.action_dim,
            });
        }

        let n = batch.batch_size;
        let device = &self.device;
        let matrix = |data: &[f32], cols: usize| {
            Tensor::<B, 2>::from_data(TensorData::new(data.to_vec(), [n, cols]), device)
        };
        let vector = |data: &[f32]| Tensor::<B, 1>::from_data(TensorData::new(data.to_vec(), [n]), device);

        Ok(BatchTensors {
            states: matrix(&batch.states, self.state_dim),
            actions: matrix(&batch.actions, self.action_dim),
            rewards: vector(&batch.rewards),
            next_states: matrix(&batch.next_states, self.state_dim),
            terminals: vector(&batch.terminals),
        })
    }

    pub fn actor(&self) -> &Actor<B> {
        &self.actor
    }

    pub fn critic(&self) -> &Critic<B> {
        &self.critic
    }

    pub fn target_actor(&self) -> &Actor<B> {
        &self.target_actor
    }

    pub fn target_critic(&self) -> &Critic<B> {
        &self.target_critic
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Number of completed `update` calls.
    pub fn update_count(&self) -> usize {
        self.update_count
    }
}

fn adam(max_grad_norm: Option<f32>) -> AdamConfig {
    AdamConfig::new().with_grad_clipping(max_grad_norm.map(GradientClippingConfig::Norm))
}
