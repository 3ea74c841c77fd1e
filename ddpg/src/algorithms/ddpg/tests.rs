//! Learning update tests on the CPU autodiff backend.

use burn::backend::{Autodiff, NdArray};
use burn::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

type B = Autodiff<NdArray<f32>>;
type Inner = NdArray<f32>;

fn small_config() -> DdpgConfig {
    DdpgConfig::hopper()
        .with_hidden_sizes(32, 32)
        .with_batch_size(16)
}

fn random_batch(n: usize, state_dim: usize, action_dim: usize, seed: u64) -> ReplayBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut uniform = |len: usize| -> Vec<f32> { (0..len).map(|_| rng.random_range(-1.0..1.0)).collect() };

    ReplayBatch {
        states: uniform(n * state_dim),
        actions: uniform(n * action_dim),
        rewards: uniform(n),
        next_states: uniform(n * state_dim),
        terminals: vec![0.0; n],
        indices: (0..n).collect(),
        batch_size: n,
        state_dim,
        action_dim,
    }
}

fn flat<const D: usize>(t: Tensor<B, D>) -> Vec<f32> {
    t.into_data().to_vec::<f32>().unwrap()
}

fn tensor1(values: &[f32]) -> Tensor<Inner, 1> {
    Tensor::from_data(TensorData::new(values.to_vec(), [values.len()]), &Default::default())
}

// ============================================================================
// Loss functions
// ============================================================================

#[test]
fn test_td_targets_unmasked_bootstraps_everything() {
    let rewards = tensor1(&[1.0, -10.0, 0.5]);
    let terminals = tensor1(&[0.0, 1.0, 0.0]);
    let next_q = tensor1(&[2.0, 4.0, -1.0]);

    let y = ddpg_td_targets(rewards, terminals, next_q, 0.99, false)
        .into_data()
        .to_vec::<f32>()
        .unwrap();

    let expected = [1.0 + 0.99 * 2.0, -10.0 + 0.99 * 4.0, 0.5 - 0.99];
    for (a, b) in y.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_td_targets_masked_drops_terminal_bootstrap() {
    let rewards = tensor1(&[1.0, -10.0]);
    let terminals = tensor1(&[0.0, 1.0]);
    let next_q = tensor1(&[2.0, 4.0]);

    let y = ddpg_td_targets(rewards, terminals, next_q, 0.99, true)
        .into_data()
        .to_vec::<f32>()
        .unwrap();

    assert!((y[0] - (1.0 + 0.99 * 2.0)).abs() < 1e-6);
    assert_eq!(y[1], -10.0);
}

#[test]
fn test_critic_loss_zero_when_q_matches_targets() {
    let q = tensor1(&[0.3, -1.7, 42.0, 0.0]);
    let loss: f32 = ddpg_critic_loss(q.clone(), q).into_scalar();
    assert_eq!(loss, 0.0);
}

#[test]
fn test_critic_loss_is_mse() {
    let q = tensor1(&[1.0, 2.0]);
    let y = tensor1(&[0.0, 4.0]);
    let loss: f32 = ddpg_critic_loss(q, y).into_scalar();
    assert!((loss - 2.5).abs() < 1e-6);
}

#[test]
fn test_actor_loss_is_negated_mean_q() {
    let q = tensor1(&[1.0, 3.0, -1.0]);
    let loss: f32 = ddpg_actor_loss(q).into_scalar();
    assert!((loss + 1.0).abs() < 1e-6);
}

#[test]
fn test_update_stats_mean() {
    let stats = [
        UpdateStats { critic_loss: 1.0, actor_loss: -2.0, mean_q: 3.0 },
        UpdateStats { critic_loss: 3.0, actor_loss: -4.0, mean_q: 5.0 },
    ];
    let mean = UpdateStats::mean_of(&stats);
    assert_eq!(mean, UpdateStats { critic_loss: 2.0, actor_loss: -3.0, mean_q: 4.0 });
    assert_eq!(UpdateStats::mean_of(&[]), UpdateStats::default());
}

// ============================================================================
// Agent
// ============================================================================

#[test]
fn test_targets_start_equal_to_online() {
    let agent = DdpgAgent::<B>::new(small_config(), 5, 2, Default::default()).unwrap();

    let states = Tensor::<B, 2>::ones([3, 5], agent.device());
    let online = flat(agent.actor().act(states.clone()));
    let target = flat(agent.target_actor().act(states));
    assert_eq!(online, target);
}

#[test]
fn test_critic_loss_exactly_zero_when_critic_matches_target() {
    // With γ = 0 the TD target is the stored reward, so rewards equal to the
    // critic's own predictions make every residual exactly zero.
    let config = small_config().with_discount(0.0);
    let agent = DdpgAgent::<B>::new(config, 4, 2, Default::default()).unwrap();

    let mut batch = random_batch(16, 4, 2, 1);
    batch.rewards = agent.q_values(&batch).unwrap();

    assert_eq!(agent.critic_loss(&batch).unwrap(), 0.0);
}

#[test]
fn test_update_moves_online_but_not_targets() {
    let mut agent = DdpgAgent::<B>::new(small_config(), 4, 2, Default::default()).unwrap();
    let batch = random_batch(16, 4, 2, 2);

    let fixed_state = Tensor::<B, 2>::ones([1, 4], agent.device());
    let fixed_action = Tensor::<B, 2>::zeros([1, 2], agent.device());
    let q_before = flat(agent.critic().evaluate(fixed_state.clone(), fixed_action.clone()));
    let a_before = flat(agent.actor().act(fixed_state.clone()));
    let tq_before = flat(agent.target_critic().evaluate(fixed_state.clone(), fixed_action.clone()));

    let stats = agent.update(&batch).unwrap();
    assert!(stats.critic_loss.is_finite());
    assert!(stats.actor_loss.is_finite());
    assert_eq!(agent.update_count(), 1);

    assert_ne!(flat(agent.critic().evaluate(fixed_state.clone(), fixed_action.clone())), q_before);
    assert_ne!(flat(agent.actor().act(fixed_state.clone())), a_before);
    assert_eq!(flat(agent.target_critic().evaluate(fixed_state, fixed_action)), tq_before);
}

#[test]
fn test_sync_targets_with_rate_one_copies_online() {
    let config = small_config().with_polyak_rate(1.0);
    let mut agent = DdpgAgent::<B>::new(config, 4, 2, Default::default()).unwrap();
    agent.update(&random_batch(16, 4, 2, 3)).unwrap();
    agent.sync_targets();

    let fixed_state = Tensor::<B, 2>::ones([2, 4], agent.device());
    let action = Tensor::<B, 2>::ones([2, 2], agent.device());
    assert_eq!(
        flat(agent.critic().evaluate(fixed_state.clone(), action.clone())),
        flat(agent.target_critic().evaluate(fixed_state.clone(), action)),
    );
    assert_eq!(flat(agent.actor().act(fixed_state.clone())), flat(agent.target_actor().act(fixed_state)));
}

#[test]
fn test_sync_targets_with_rate_zero_keeps_targets() {
    let config = small_config().with_polyak_rate(0.0);
    let mut agent = DdpgAgent::<B>::new(config, 4, 2, Default::default()).unwrap();

    let fixed_state = Tensor::<B, 2>::ones([1, 4], agent.device());
    let before = flat(agent.target_actor().act(fixed_state.clone()));

    agent.update(&random_batch(16, 4, 2, 4)).unwrap();
    agent.sync_targets();
    assert_eq!(flat(agent.target_actor().act(fixed_state)), before);
}

#[test]
fn test_repeated_updates_reduce_critic_loss_on_fixed_batch() {
    let mut agent = DdpgAgent::<B>::new(small_config(), 4, 2, Default::default()).unwrap();
    let batch = random_batch(16, 4, 2, 5);

    let initial = agent.critic_loss(&batch).unwrap();
    for _ in 0..200 {
        agent.update(&batch).unwrap();
    }
    let trained = agent.critic_loss(&batch).unwrap();
    assert!(trained < initial, "loss {} -> {}", initial, trained);
}

#[test]
fn test_act_returns_bounded_action() {
    let config = small_config().with_max_control_signal(0.5);
    let agent = DdpgAgent::<B>::new(config, 3, 2, Default::default()).unwrap();

    let action = agent.act(&[0.1, -0.2, 0.3]).unwrap();
    assert_eq!(action.len(), 2);
    assert!(action.iter().all(|a| a.abs() <= 0.5));
}

#[test]
fn test_shape_mismatch_is_reported() {
    let mut agent = DdpgAgent::<B>::new(small_config(), 4, 2, Default::default()).unwrap();

    assert!(matches!(
        agent.act(&[0.0; 3]),
        Err(crate::error::DdpgError::ShapeMismatch { what: "state", expected: 4, actual: 3 })
    ));

    let wrong_dims = random_batch(8, 3, 2, 6);
    assert!(matches!(
        agent.update(&wrong_dims),
        Err(crate::error::DdpgError::ShapeMismatch { .. })
    ));

    let mut ragged = random_batch(8, 4, 2, 7);
    ragged.rewards.pop();
    assert!(matches!(
        agent.update(&ragged),
        Err(crate::error::DdpgError::ShapeMismatch { what: "rewards", .. })
    ));
    assert_eq!(agent.update_count(), 0);
}

#[test]
fn test_load_networks_resets_targets() {
    let device = Default::default();
    let config = small_config();
    let mut agent = DdpgAgent::<B>::new(config.clone(), 4, 2, device).unwrap();

    let actor = ActorConfig::from_ddpg(&config, 4, 2).init::<B>(agent.device());
    let critic = CriticConfig::from_ddpg(&config, 4, 2).init::<B>(agent.device());
    let fixed_state = Tensor::<B, 2>::ones([1, 4], agent.device());
    let expected = flat(actor.act(fixed_state.clone()));

    agent.load_networks(actor, critic).unwrap();
    assert_eq!(flat(agent.actor().act(fixed_state.clone())), expected);
    assert_eq!(flat(agent.target_actor().act(fixed_state)), expected);

    let wrong = ActorConfig::from_ddpg(&config, 5, 2).init::<B>(agent.device());
    let critic = CriticConfig::from_ddpg(&config, 4, 2).init::<B>(agent.device());
    assert!(agent.load_networks(wrong, critic).is_err());
}
