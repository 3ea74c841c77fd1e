//! Training phase derived from the global step counter.

use std::fmt;

/// Where the session is in its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Uniform random actions. Learning may already run unless held back by config.
    #[default]
    WarmingUp,
    /// Noisy policy actions with periodic learning bursts.
    ExploringAndLearning,
}

impl Phase {
    /// Phase for the step about to be taken.
    #[inline]
    pub fn at(total_step: usize, warmup_steps: usize) -> Self {
        if total_step < warmup_steps {
            Self::WarmingUp
        } else {
            Self::ExploringAndLearning
        }
    }

    #[inline]
    pub fn is_learning(&self) -> bool {
        matches!(self, Self::ExploringAndLearning)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WarmingUp => "warming_up",
            Self::ExploringAndLearning => "exploring_and_learning",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
