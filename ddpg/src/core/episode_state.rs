//! Episode end classification.
//!
//! - **Terminal**: the environment reached an absorbing state (the hopper
//!   fell). The stored reward is replaced by the terminal penalty and the
//!   bootstrap term is masked.
//! - **Truncated**: an external step limit ended the episode. The next state
//!   still has value, so the bootstrap term is kept.
//!
//! Both end the episode for bookkeeping purposes.

/// How a step left the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EpisodeState {
    /// Episode is ongoing.
    #[default]
    Running,
    /// Episode ended in an absorbing state.
    Terminal,
    /// Episode hit an external limit.
    Truncated,
}

impl EpisodeState {
    /// Classify from environment flags. Terminal wins when both are set.
    #[inline]
    pub fn from_flags(terminated: bool, truncated: bool) -> Self {
        if terminated {
            Self::Terminal
        } else if truncated {
            Self::Truncated
        } else {
            Self::Running
        }
    }

    /// Whether the stored transition should carry the terminal penalty.
    #[inline]
    pub fn applies_penalty(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Whether the TD-target may bootstrap from the next state.
    #[inline]
    pub fn needs_bootstrap(&self) -> bool {
        !matches!(self, Self::Terminal)
    }

    /// Whether the episode is over (terminal or truncated).
    #[inline]
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Running)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}
