//! Error taxonomy for DDPG training.
//!
//! Sampling an empty buffer and malformed batches are orchestration bugs and
//! surface as errors that terminate the training loop. Environment failures
//! are propagated unchanged; nothing is retried.

use std::io;

use thiserror::Error;

/// Boxed error produced by an environment collaborator.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the training stack.
#[derive(Error, Debug)]
pub enum DdpgError {
    /// Sampling was requested before the replay buffer held a transition.
    #[error("insufficient data: requested {requested} samples, buffer holds {available}")]
    InsufficientData { requested: usize, available: usize },

    /// A batch or transition reached the learner with the wrong dimensions.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid config `{param}`: {message}")]
    InvalidConfig { param: String, message: String },

    /// The environment collaborator failed.
    #[error("environment failure: {0}")]
    Environment(#[source] BoxedError),

    /// Network parameters could not be saved or loaded.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Config (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tensor data could not be converted back to host values.
    #[error("tensor conversion error: {0}")]
    Tensor(String),
}

impl DdpgError {
    /// Build an `InvalidConfig` error.
    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        DdpgError::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Wrap an environment error.
    pub fn environment<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DdpgError::Environment(Box::new(err))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DdpgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DdpgError::InsufficientData {
            requested: 100,
            available: 0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: requested 100 samples, buffer holds 0"
        );

        let err = DdpgError::ShapeMismatch {
            what: "states",
            expected: 1100,
            actual: 1000,
        };
        assert!(err.to_string().contains("states"));

        let err = DdpgError::invalid_config("batch_size", "must be at least 1");
        assert_eq!(err.to_string(), "invalid config `batch_size`: must be at least 1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: DdpgError = io_err.into();
        assert!(matches!(err, DdpgError::Io(_)));
    }
}
