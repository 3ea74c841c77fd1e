//! Transition type stored in the replay buffer.

use super::episode_state::EpisodeState;

/// One environment step: `(s, a, r, s')` plus whether `s'` is absorbing.
///
/// Immutable once stored; the buffer copies it into its parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State the action was taken in.
    pub state: Vec<f32>,
    /// Continuous action vector that was executed.
    pub action: Vec<f32>,
    /// Reward as stored (terminal penalty already applied).
    pub reward: f32,
    /// Resulting state.
    pub next_state: Vec<f32>,
    /// Episode reached an absorbing state at `next_state`.
    pub terminal: bool,
}

impl Transition {
    /// Create a non-terminal transition.
    pub fn new(state: Vec<f32>, action: Vec<f32>, reward: f32, next_state: Vec<f32>) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            terminal: false,
        }
    }

    /// Builder pattern: mark as terminal.
    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    /// Build from a step outcome, replacing the reward with `penalty` when
    /// the episode ended in an absorbing state.
    pub fn from_step(
        state: Vec<f32>,
        action: Vec<f32>,
        reward: f32,
        next_state: Vec<f32>,
        episode_state: EpisodeState,
        penalty: Option<f32>,
    ) -> Self {
        let reward = match penalty {
            Some(p) if episode_state.applies_penalty() => p,
            _ => reward,
        };
        Self {
            state,
            action,
            reward,
            next_state,
            terminal: !episode_state.needs_bootstrap(),
        }
    }

    pub fn state_dim(&self) -> usize {
        self.state.len()
    }

    pub fn action_dim(&self) -> usize {
        self.action.len()
    }
}
