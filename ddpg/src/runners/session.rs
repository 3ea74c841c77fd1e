//! Single-threaded DDPG training session.
//!
//! # Schedule
//!
//! ```text
//! per step (1-based global step k):
//!   k <  warmup_steps  → uniform random action            (WarmingUp)
//!   k >= warmup_steps  → clip(μ(s) + OU noise)            (ExploringAndLearning)
//!
//!   step env, store transition (terminal reward replaced by the penalty)
//!
//!   episode over → record reward, reset counters, next step starts a new episode
//!   otherwise:
//!     k > learning_starts, (k + 1) % train_every == 0
//!         → updates_per_train × (sample, update, sync targets)
//!     (during warm-up only if learn_during_warmup is set, the default)
//!     running reward > best → checkpoint
//! ```
//!
//! The stop flag is only checked between episodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithms::ddpg::{DdpgAgent, DdpgConfig, ReplayBuffer, UpdateStats};
use crate::checkpoint::Checkpointer;
use crate::core::episode_state::EpisodeState;
use crate::core::noise::{OrnsteinUhlenbeckConfig, OrnsteinUhlenbeckNoise};
use crate::core::phase::Phase;
use crate::core::transition::Transition;
use crate::environment::Environment;
use crate::error::{DdpgError, Result};
use crate::metrics::{EpisodeSnapshot, MetricsLogger, RewardHistory};

/// Best score before any step has been taken.
pub const INITIAL_MAX_SCORE: f32 = -10_000.0;

// ============================================================================
// Stop Handle
// ============================================================================

/// Cloneable cancellation flag shared with signal handlers.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the session to stop at the next episode boundary.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Step Report
// ============================================================================

/// What happened during one call to [`TrainingSession::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Global step count after this step.
    pub total_step: usize,
    pub phase: Phase,
    /// Reward as stored in the replay buffer.
    pub reward: f32,
    pub episode_state: EpisodeState,
    /// A learning burst ran after this step.
    pub learned: bool,
    /// The networks were checkpointed after this step.
    pub checkpointed: bool,
}

// ============================================================================
// Training Session
// ============================================================================

/// Owns the agent, replay buffer, noise process, counters and reward history
/// for one training run.
pub struct TrainingSession<B: AutodiffBackend, E: Environment> {
    config: DdpgConfig,
    env: E,
    agent: DdpgAgent<B>,
    buffer: ReplayBuffer,
    noise: OrnsteinUhlenbeckNoise,
    rng: StdRng,

    current_state: Option<Vec<f32>>,
    current_game_number: usize,
    move_number: usize,
    cumulative_reward: f32,
    total_step: usize,
    max_score: f32,

    reward_history: RewardHistory,
    exploration_enabled: bool,
    stop: StopHandle,
    checkpointer: Option<Checkpointer>,
    logger: Option<Box<dyn MetricsLogger>>,

    learning_bursts: usize,
    last_update: Option<UpdateStats>,
}

impl<B: AutodiffBackend, E: Environment> TrainingSession<B, E> {
    /// Build a session with fresh networks sized to `env`.
    pub fn new(config: DdpgConfig, env: E, device: B::Device) -> Result<Self> {
        config.validate()?;
        let state_dim = env.state_dim();
        let action_dim = env.action_dim();
        let agent = DdpgAgent::new(config.clone(), state_dim, action_dim, device)?;
        Ok(Self::with_agent(config, env, agent))
    }

    /// Build a session around an existing agent, e.g. one restored from a checkpoint.
    pub fn with_agent(config: DdpgConfig, env: E, agent: DdpgAgent<B>) -> Self {
        let state_dim = agent.state_dim();
        let action_dim = agent.action_dim();

        let noise_config = OrnsteinUhlenbeckConfig::new(action_dim, config.noise_std_dev)
            .with_theta(config.noise_theta)
            .with_dt(config.noise_dt);

        let (buffer, noise, rng) = match config.seed {
            Some(seed) => (
                ReplayBuffer::with_seed(config.buffer_capacity, state_dim, action_dim, seed),
                noise_config.init_with_seed(seed.wrapping_add(1)),
                StdRng::seed_from_u64(seed.wrapping_add(2)),
            ),
            None => (
                ReplayBuffer::new(config.buffer_capacity, state_dim, action_dim),
                noise_config.init(),
                StdRng::from_os_rng(),
            ),
        };

        Self {
            config,
            env,
            agent,
            buffer,
            noise,
            rng,
            current_state: None,
            current_game_number: 0,
            move_number: 0,
            cumulative_reward: 0.0,
            total_step: 0,
            max_score: INITIAL_MAX_SCORE,
            reward_history: RewardHistory::new(),
            exploration_enabled: true,
            stop: StopHandle::new(),
            checkpointer: None,
            logger: None,
            learning_bursts: 0,
            last_update: None,
        }
    }

    pub fn with_checkpointer(mut self, checkpointer: Checkpointer) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn with_logger<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    /// Share an externally created stop flag.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    // ------------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------------

    /// Run until stopped or `max_total_steps` is reached.
    ///
    /// Without a step limit this only returns on stop or error.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            state_dim = self.agent.state_dim(),
            action_dim = self.agent.action_dim(),
            warmup_steps = self.config.warmup_steps,
            batch_size = self.config.batch_size,
            polyak_rate = self.config.polyak_rate,
            "training started"
        );

        loop {
            if self.current_state.is_none() && self.stop.is_stopped() {
                tracing::info!(total_steps = self.total_step, "stop requested");
                break;
            }
            if self.step_limit_reached() {
                break;
            }
            self.step()?;
        }

        self.flush();
        Ok(())
    }

    /// Take exactly `n` environment steps, crossing episode boundaries as
    /// needed. Stops early only if a stop was requested at a boundary.
    pub fn run_steps(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            if self.current_state.is_none() && self.stop.is_stopped() {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    /// Take one environment step, starting a new episode first if needed.
    pub fn step(&mut self) -> Result<StepReport> {
        let state = match self.current_state.take() {
            Some(state) => state,
            None => self.start_episode()?,
        };

        self.total_step += 1;
        let phase = self.phase();

        let action = match phase {
            Phase::WarmingUp => self.random_action(),
            Phase::ExploringAndLearning => self.select_action(&state)?,
        };

        if self.config.render {
            self.env.render();
        }

        let outcome = self.env.step(&action).map_err(DdpgError::environment)?;
        if outcome.next_state.len() != self.agent.state_dim() {
            return Err(DdpgError::ShapeMismatch {
                what: "environment observation",
                expected: self.agent.state_dim(),
                actual: outcome.next_state.len(),
            });
        }

        let episode_state = outcome.episode_state();
        let transition = Transition::from_step(
            state,
            action,
            outcome.reward,
            outcome.next_state,
            episode_state,
            self.config.terminal_penalty,
        );
        self.buffer.push(&transition);

        self.move_number += 1;
        self.cumulative_reward += transition.reward;

        let mut report = StepReport {
            total_step: self.total_step,
            phase,
            reward: transition.reward,
            episode_state,
            learned: false,
            checkpointed: false,
        };

        if episode_state.is_done() {
            self.end_episode(episode_state);
            return Ok(report);
        }

        if self.should_learn(phase) {
            self.learn()?;
            report.learned = true;
        }

        if self.cumulative_reward > self.max_score {
            self.max_score = self.cumulative_reward;
            if let Some(checkpointer) = self.checkpointer.as_mut() {
                checkpointer.save_agent(&self.agent, self.max_score)?;
                report.checkpointed = true;
            }
        }

        self.current_state = Some(transition.next_state);
        Ok(report)
    }

    /// Reset the environment and noise process and start a new episode.
    ///
    /// Called by [`Self::step`] whenever no episode is in progress. Calling it
    /// mid-episode abandons the current episode without recording it.
    pub fn begin_episode(&mut self) -> Result<()> {
        let state = self.start_episode()?;
        self.current_state = Some(state);
        Ok(())
    }

    fn start_episode(&mut self) -> Result<Vec<f32>> {
        let state = self.env.reset().map_err(DdpgError::environment)?;
        if state.len() != self.agent.state_dim() {
            return Err(DdpgError::ShapeMismatch {
                what: "environment observation",
                expected: self.agent.state_dim(),
                actual: state.len(),
            });
        }
        self.noise.reset();
        self.current_game_number += 1;
        self.move_number = 0;
        self.cumulative_reward = 0.0;
        Ok(state)
    }

    /// Clipped `μ(s) + noise`.
    ///
    /// The noise process advances on every call; its sample is only added
    /// while exploration is enabled.
    pub fn select_action(&mut self, state: &[f32]) -> Result<Vec<f32>> {
        let mut action = self.agent.act(state)?;
        let noise = self.noise.sample();
        if self.exploration_enabled {
            for (a, n) in action.iter_mut().zip(noise) {
                *a += n;
            }
        }
        let (low, high) = (self.config.action_low, self.config.action_high);
        for a in action.iter_mut() {
            *a = a.clamp(low, high);
        }
        Ok(action)
    }

    fn random_action(&mut self) -> Vec<f32> {
        let (low, high) = (self.config.action_low, self.config.action_high);
        (0..self.agent.action_dim())
            .map(|_| self.rng.random_range(low..high))
            .collect()
    }

    fn should_learn(&self, phase: Phase) -> bool {
        (phase.is_learning() || self.config.learn_during_warmup)
            && self.total_step > self.config.learning_starts
            && (self.total_step + 1) % self.config.train_every == 0
    }

    /// `updates_per_train` rounds of sample, update, target sync.
    fn learn(&mut self) -> Result<UpdateStats> {
        let mut stats = Vec::with_capacity(self.config.updates_per_train);
        for _ in 0..self.config.updates_per_train {
            let batch = self.buffer.sample(self.config.batch_size)?;
            stats.push(self.agent.update(&batch)?);
            self.agent.sync_targets();
        }

        let mean = UpdateStats::mean_of(&stats);
        self.learning_bursts += 1;
        self.last_update = Some(mean);

        tracing::debug!(
            total_steps = self.total_step,
            updates = self.agent.update_count(),
            critic_loss = mean.critic_loss,
            actor_loss = mean.actor_loss,
            mean_q = mean.mean_q,
            "learning burst"
        );
        Ok(mean)
    }

    fn end_episode(&mut self, episode_state: EpisodeState) {
        let reward = self.cumulative_reward;
        self.reward_history.push(reward);

        let score = match self.config.terminal_penalty {
            Some(penalty) if episode_state.applies_penalty() => reward - penalty,
            _ => reward,
        };
        tracing::info!(
            episode = self.current_game_number,
            moves = self.move_number,
            reward,
            score,
            terminal = episode_state.is_terminal(),
            total_steps = self.total_step,
            "episode ended"
        );

        let snapshot = EpisodeSnapshot::new(
            self.current_game_number,
            self.total_step,
            self.move_number,
            reward,
        )
        .with_best_score(self.max_score)
        .with_phase(self.phase())
        .with_updates(self.agent.update_count(), self.last_update);
        if let Some(logger) = self.logger.as_mut() {
            logger.log(&snapshot);
        }

        self.cumulative_reward = 0.0;
        self.move_number = 0;
        self.current_state = None;
    }

    fn step_limit_reached(&self) -> bool {
        self.config
            .max_total_steps
            .is_some_and(|max| self.total_step >= max)
    }

    /// Flush the attached logger.
    pub fn flush(&mut self) {
        if let Some(logger) = self.logger.as_mut() {
            logger.flush();
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Phase of the most recent (or, before any step, the first) step.
    pub fn phase(&self) -> Phase {
        Phase::at(self.total_step, self.config.warmup_steps)
    }

    pub fn set_exploration(&mut self, enabled: bool) {
        self.exploration_enabled = enabled;
    }

    pub fn exploration_enabled(&self) -> bool {
        self.exploration_enabled
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn reward_history(&self) -> &RewardHistory {
        &self.reward_history
    }

    pub fn episode_in_progress(&self) -> bool {
        self.current_state.is_some()
    }

    /// Episodes started so far (1-based number of the current one).
    pub fn current_game_number(&self) -> usize {
        self.current_game_number
    }

    pub fn move_number(&self) -> usize {
        self.move_number
    }

    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    pub fn total_step(&self) -> usize {
        self.total_step
    }

    pub fn max_score(&self) -> f32 {
        self.max_score
    }

    pub fn learning_bursts(&self) -> usize {
        self.learning_bursts
    }

    /// Learning-update invocations so far.
    pub fn update_count(&self) -> usize {
        self.agent.update_count()
    }

    pub fn last_update(&self) -> Option<UpdateStats> {
        self.last_update
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }

    pub fn agent(&self) -> &DdpgAgent<B> {
        &self.agent
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn noise(&self) -> &OrnsteinUhlenbeckNoise {
        &self.noise
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn checkpointer(&self) -> Option<&Checkpointer> {
        self.checkpointer.as_ref()
    }
}
