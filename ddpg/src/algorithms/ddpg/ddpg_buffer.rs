//! Uniform replay buffer for DDPG.
//!
//! - **Ring buffer** semantics: once full, the oldest slot is overwritten
//! - **Parallel arrays**: states, actions, rewards, next states and terminal
//!   flags are stored flat so a batch copies straight into tensors
//! - **Uniform sampling with replacement** over the valid range
//!   `[0, min(count, capacity))`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::transition::Transition;
use crate::error::{DdpgError, Result};

// ============================================================================
// Sampled Batch
// ============================================================================

/// Mini-batch of transitions aligned by sampled index.
///
/// Row-major: `states[i * state_dim..(i + 1) * state_dim]` is sample `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayBatch {
    pub states: Vec<f32>,
    pub actions: Vec<f32>,
    pub rewards: Vec<f32>,
    pub next_states: Vec<f32>,
    /// 1.0 for terminal transitions, 0.0 otherwise.
    pub terminals: Vec<f32>,
    /// Buffer slot each sample came from.
    pub indices: Vec<usize>,
    pub batch_size: usize,
    pub state_dim: usize,
    pub action_dim: usize,
}

impl ReplayBatch {
    /// Check every array agrees with the declared dimensions.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&'static str, usize, usize); 5] = [
            ("states", self.batch_size * self.state_dim, self.states.len()),
            ("actions", self.batch_size * self.action_dim, self.actions.len()),
            ("rewards", self.batch_size, self.rewards.len()),
            ("next_states", self.batch_size * self.state_dim, self.next_states.len()),
            ("terminals", self.batch_size, self.terminals.len()),
        ];
        for (what, expected, actual) in checks {
            if expected != actual {
                return Err(DdpgError::ShapeMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }
        if self.batch_size == 0 {
            return Err(DdpgError::ShapeMismatch {
                what: "batch_size",
                expected: 1,
                actual: 0,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Replay Buffer
// ============================================================================

/// Fixed-capacity circular store of transitions.
pub struct ReplayBuffer {
    capacity: usize,
    state_dim: usize,
    action_dim: usize,
    states: Vec<f32>,
    actions: Vec<f32>,
    rewards: Vec<f32>,
    next_states: Vec<f32>,
    terminals: Vec<f32>,
    /// Total appends ever made; the write slot is `count % capacity`.
    count: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Create an empty buffer with storage for `capacity` transitions reserved up front.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize, state_dim: usize, action_dim: usize) -> Self {
        Self::with_rng(capacity, state_dim, action_dim, StdRng::from_os_rng())
    }

    /// Create an empty buffer with a deterministic sampling seed.
    pub fn with_seed(capacity: usize, state_dim: usize, action_dim: usize, seed: u64) -> Self {
        Self::with_rng(capacity, state_dim, action_dim, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, state_dim: usize, action_dim: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be positive");
        Self {
            capacity,
            state_dim,
            action_dim,
            states: Vec::with_capacity(capacity * state_dim),
            actions: Vec::with_capacity(capacity * action_dim),
            rewards: Vec::with_capacity(capacity),
            next_states: Vec::with_capacity(capacity * state_dim),
            terminals: Vec::with_capacity(capacity),
            count: 0,
            rng,
        }
    }

    /// Store a non-terminal transition at the cursor and advance it.
    pub fn append(&mut self, state: &[f32], action: &[f32], reward: f32, next_state: &[f32]) {
        self.write(state, action, reward, next_state, false);
    }

    /// Store a transition, keeping its terminal flag.
    pub fn push(&mut self, transition: &Transition) {
        self.write(
            &transition.state,
            &transition.action,
            transition.reward,
            &transition.next_state,
            transition.terminal,
        );
    }

    fn write(&mut self, state: &[f32], action: &[f32], reward: f32, next_state: &[f32], terminal: bool) {
        assert_eq!(state.len(), self.state_dim, "state dimension");
        assert_eq!(action.len(), self.action_dim, "action dimension");
        assert_eq!(next_state.len(), self.state_dim, "next_state dimension");

        let terminal = if terminal { 1.0 } else { 0.0 };

        if self.count < self.capacity {
            // Filling reserved storage
            self.states.extend_from_slice(state);
            self.actions.extend_from_slice(action);
            self.rewards.push(reward);
            self.next_states.extend_from_slice(next_state);
            self.terminals.push(terminal);
        } else {
            let slot = self.count % self.capacity;
            let s = slot * self.state_dim;
            let a = slot * self.action_dim;
            self.states[s..s + self.state_dim].copy_from_slice(state);
            self.actions[a..a + self.action_dim].copy_from_slice(action);
            self.rewards[slot] = reward;
            self.next_states[s..s + self.state_dim].copy_from_slice(next_state);
            self.terminals[slot] = terminal;
        }
        self.count += 1;
    }

    /// Draw `batch_size` transitions uniformly with replacement.
    pub fn sample(&mut self, batch_size: usize) -> Result<ReplayBatch> {
        let len = self.len();
        if len == 0 {
            return Err(DdpgError::InsufficientData {
                requested: batch_size,
                available: 0,
            });
        }
        let indices: Vec<usize> = (0..batch_size).map(|_| self.rng.random_range(0..len)).collect();
        Ok(self.gather(indices))
    }

    /// Assemble a batch from explicit slots.
    fn gather(&self, indices: Vec<usize>) -> ReplayBatch {
        let batch_size = indices.len();
        let mut batch = ReplayBatch {
            states: Vec::with_capacity(batch_size * self.state_dim),
            actions: Vec::with_capacity(batch_size * self.action_dim),
            rewards: Vec::with_capacity(batch_size),
            next_states: Vec::with_capacity(batch_size * self.state_dim),
            terminals: Vec::with_capacity(batch_size),
            indices: Vec::new(),
            batch_size,
            state_dim: self.state_dim,
            action_dim: self.action_dim,
        };

        for &idx in &indices {
            let s = idx * self.state_dim;
            let a = idx * self.action_dim;
            batch.states.extend_from_slice(&self.states[s..s + self.state_dim]);
            batch.actions.extend_from_slice(&self.actions[a..a + self.action_dim]);
            batch.rewards.push(self.rewards[idx]);
            batch.next_states.extend_from_slice(&self.next_states[s..s + self.state_dim]);
            batch.terminals.push(self.terminals[idx]);
        }
        batch.indices = indices;
        batch
    }

    /// Transition stored in `slot`, if that slot is in the valid range.
    pub fn get(&self, slot: usize) -> Option<Transition> {
        if slot >= self.len() {
            return None;
        }
        let s = slot * self.state_dim;
        let a = slot * self.action_dim;
        Some(Transition {
            state: self.states[s..s + self.state_dim].to_vec(),
            action: self.actions[a..a + self.action_dim].to_vec(),
            reward: self.rewards[slot],
            next_state: self.next_states[s..s + self.state_dim].to_vec(),
            terminal: self.terminals[slot] > 0.5,
        })
    }

    /// Number of valid transitions: `min(count, capacity)`.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.min(self.capacity)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total appends since creation.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Drop all transitions. The sampling RNG keeps its state.
    pub fn clear(&mut self) {
        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
        self.next_states.clear();
        self.terminals.clear();
        self.count = 0;
    }
}

impl std::fmt::Debug for ReplayBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("count", &self.count)
            .field("state_dim", &self.state_dim)
            .field("action_dim", &self.action_dim)
            .finish()
    }
}
