//! Training orchestration.
//!
//! [`TrainingSession`] drives one environment through warm-up, exploration,
//! periodic learning bursts and checkpointing. Cancellation goes through a
//! shared [`StopHandle`] that the session checks between episodes.

pub mod session;


pub use session::{StepReport, StopHandle, TrainingSession, INITIAL_MAX_SCORE};
