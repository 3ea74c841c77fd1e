//! Network checkpointing.
//!
//! ```rust,ignore
//! use ddpg::checkpoint::{Checkpointer, CheckpointerConfig};
//!
//! let mut checkpointer = Checkpointer::new(CheckpointerConfig::new("./networks"))?;
//! checkpointer.save_agent(&agent, score)?;
//!
//! let actor = checkpointer.load_actor(actor_template, &device)?;
//! ```

pub mod checkpointer;

pub use checkpointer::{Checkpointer, CheckpointerConfig};
