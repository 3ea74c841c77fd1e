//! Training progress reporting.
//!
//! - [`RewardHistory`]: Per-episode rewards, ASCII chart and CSV export
//! - [`ConsoleLogger`]: Interval-gated `tracing` events
//! - [`CsvLogger`]: One CSV row per episode
//! - [`MultiLogger`]: Combine multiple loggers

pub mod logger;
pub mod reward_history;

pub use logger::{ConsoleLogger, CsvLogger, EpisodeSnapshot, MetricsLogger, MultiLogger};
pub use reward_history::RewardHistory;
