//! Actor/critic checkpointing.
//!
//! Both online networks are written side by side as `actor.bin` and
//! `critic.bin`. Each save overwrites the previous one.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::{AutodiffBackend, Backend};

use crate::algorithms::ddpg::DdpgAgent;
use crate::error::{DdpgError, Result};

/// Configuration for the checkpointer.
#[derive(Debug, Clone)]
pub struct CheckpointerConfig {
    /// Directory to store checkpoints.
    pub checkpoint_dir: PathBuf,
    /// File stem for the actor parameters.
    pub actor_name: String,
    /// File stem for the critic parameters.
    pub critic_name: String,
}

impl Default for CheckpointerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("./networks"),
            actor_name: "actor".to_string(),
            critic_name: "critic".to_string(),
        }
    }
}

impl CheckpointerConfig {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_names(mut self, actor: impl Into<String>, critic: impl Into<String>) -> Self {
        self.actor_name = actor.into();
        self.critic_name = critic.into();
        self
    }
}

/// Writes the online actor and critic whenever the caller reports a new best.
pub struct Checkpointer {
    config: CheckpointerConfig,
    best_score: Option<f32>,
    save_count: usize,
}

impl Checkpointer {
    /// Create a new checkpointer.
    ///
    /// Creates the checkpoint directory if it doesn't exist.
    pub fn new(config: CheckpointerConfig) -> Result<Self> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(Self {
            config,
            best_score: None,
            save_count: 0,
        })
    }

    pub fn config(&self) -> &CheckpointerConfig {
        &self.config
    }

    pub fn actor_path(&self) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(format!("{}.bin", self.config.actor_name))
    }

    pub fn critic_path(&self) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(format!("{}.bin", self.config.critic_name))
    }

    /// Save both networks, recording `score` as the score they achieved.
    pub fn save<B, A, C>(&mut self, actor: &A, critic: &C, score: f32) -> Result<()>
    where
        B: Backend,
        A: Module<B>,
        C: Module<B>,
    {
        save_module(actor, &self.actor_path())?;
        save_module(critic, &self.critic_path())?;

        self.best_score = Some(self.best_score.map_or(score, |b| b.max(score)));
        self.save_count += 1;
        tracing::info!(
            score,
            dir = %self.config.checkpoint_dir.display(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Save the agent's online networks.
    pub fn save_agent<B: AutodiffBackend>(&mut self, agent: &DdpgAgent<B>, score: f32) -> Result<()> {
        self.save(agent.actor(), agent.critic(), score)
    }

    /// Load actor parameters into a template of matching architecture.
    pub fn load_actor<B: Backend, M: Module<B>>(&self, template: M, device: &B::Device) -> Result<M> {
        load_module(template, &self.actor_path(), device)
    }

    /// Load critic parameters into a template of matching architecture.
    pub fn load_critic<B: Backend, M: Module<B>>(&self, template: M, device: &B::Device) -> Result<M> {
        load_module(template, &self.critic_path(), device)
    }

    /// Both network files are present.
    pub fn has_checkpoint(&self) -> bool {
        self.actor_path().exists() && self.critic_path().exists()
    }

    /// Highest score passed to `save` by this instance.
    pub fn best_score(&self) -> Option<f32> {
        self.best_score
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

fn save_module<B: Backend, M: Module<B>>(module: &M, path: &Path) -> Result<()> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    module
        .clone()
        .save_file(path, &recorder)
        .map_err(|e| DdpgError::Checkpoint(format!("{}: {}", path.display(), e)))
}

fn load_module<B: Backend, M: Module<B>>(template: M, path: &Path, device: &B::Device) -> Result<M> {
    if !path.exists() {
        return Err(DdpgError::Checkpoint(format!("{} not found", path.display())));
    }
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    template
        .load_file(path, &recorder, device)
        .map_err(|e| DdpgError::Checkpoint(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ddpg::{ActorConfig, CriticConfig};
    use burn::backend::NdArray;
    use burn::prelude::*;
    use tempfile::tempdir;

    type B = NdArray<f32>;

    #[test]
    fn test_dir_creation_and_paths() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested/networks");
        let checkpointer = Checkpointer::new(CheckpointerConfig::new(&nested)).unwrap();

        assert!(nested.exists());
        assert_eq!(checkpointer.actor_path(), nested.join("actor.bin"));
        assert_eq!(checkpointer.critic_path(), nested.join("critic.bin"));
        assert!(!checkpointer.has_checkpoint());
        assert_eq!(checkpointer.best_score(), None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let mut checkpointer = Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();

        let actor = ActorConfig::new(3, 1).with_hidden_sizes(8, 8).init::<B>(&device);
        let critic = CriticConfig::new(3, 1).with_hidden_sizes(8, 8).init::<B>(&device);
        checkpointer.save(&actor, &critic, 12.5).unwrap();
        checkpointer.save(&actor, &critic, 3.0).unwrap();

        assert!(checkpointer.has_checkpoint());
        assert_eq!(checkpointer.save_count(), 2);
        assert_eq!(checkpointer.best_score(), Some(12.5));

        let fresh_actor = ActorConfig::new(3, 1).with_hidden_sizes(8, 8).init::<B>(&device);
        let fresh_critic = CriticConfig::new(3, 1).with_hidden_sizes(8, 8).init::<B>(&device);
        let loaded_actor = checkpointer.load_actor(fresh_actor, &device).unwrap();
        let loaded_critic = checkpointer.load_critic(fresh_critic, &device).unwrap();

        let states = Tensor::<B, 2>::ones([2, 3], &device);
        let actions = Tensor::<B, 2>::ones([2, 1], &device);
        assert_eq!(
            actor.act(states.clone()).into_data(),
            loaded_actor.act(states.clone()).into_data()
        );
        assert_eq!(
            critic.evaluate(states.clone(), actions.clone()).into_data(),
            loaded_critic.evaluate(states, actions).into_data()
        );
    }

    #[test]
    fn test_load_missing_is_error() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();
        let template = ActorConfig::new(3, 1).with_hidden_sizes(8, 8).init::<B>(&device);

        assert!(matches!(
            checkpointer.load_actor(template, &device),
            Err(DdpgError::Checkpoint(_))
        ));
    }
}
