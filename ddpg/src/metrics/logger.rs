//! Episode loggers.
//!
//! Every finished episode produces one [`EpisodeSnapshot`]; loggers decide
//! what to do with it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::algorithms::ddpg::UpdateStats;
use crate::core::phase::Phase;

/// Summary of one finished episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSnapshot {
    /// 1-based episode number.
    pub episode: usize,
    /// Global environment steps so far.
    pub total_steps: usize,
    /// Steps taken in this episode.
    pub moves: usize,
    /// Episode score as recorded in the reward history.
    pub cumulative_reward: f32,
    /// Best running score seen so far.
    pub best_score: f32,
    pub phase: Phase,
    /// Learning updates performed so far.
    pub updates: usize,
    /// Mean stats of the most recent learning burst.
    pub last_update: Option<UpdateStats>,
}

impl EpisodeSnapshot {
    pub fn new(episode: usize, total_steps: usize, moves: usize, cumulative_reward: f32) -> Self {
        Self {
            episode,
            total_steps,
            moves,
            cumulative_reward,
            best_score: f32::NEG_INFINITY,
            phase: Phase::WarmingUp,
            updates: 0,
            last_update: None,
        }
    }

    pub fn with_best_score(mut self, best_score: f32) -> Self {
        self.best_score = best_score;
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_updates(mut self, updates: usize, last_update: Option<UpdateStats>) -> Self {
        self.updates = updates;
        self.last_update = last_update;
        self
    }
}

/// Logger trait for different logging backends.
pub trait MetricsLogger: Send {
    fn log(&mut self, snapshot: &EpisodeSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Emits one `tracing` event every `log_interval` episodes.
pub struct ConsoleLogger {
    log_interval: usize,
    last_logged: usize,
    start_time: Instant,
}

impl ConsoleLogger {
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
            last_logged: 0,
            start_time: Instant::now(),
        }
    }

    fn due(&self, episode: usize) -> bool {
        episode >= self.last_logged + self.log_interval
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &EpisodeSnapshot) {
        if !self.due(snapshot.episode) {
            return;
        }

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let sps = if elapsed > 0.0 {
            snapshot.total_steps as f32 / elapsed
        } else {
            0.0
        };

        match snapshot.last_update {
            Some(stats) => tracing::info!(
                episode = snapshot.episode,
                total_steps = snapshot.total_steps,
                moves = snapshot.moves,
                reward = snapshot.cumulative_reward,
                best = snapshot.best_score,
                phase = %snapshot.phase,
                updates = snapshot.updates,
                critic_loss = stats.critic_loss,
                actor_loss = stats.actor_loss,
                mean_q = stats.mean_q,
                sps,
                "episode finished"
            ),
            None => tracing::info!(
                episode = snapshot.episode,
                total_steps = snapshot.total_steps,
                moves = snapshot.moves,
                reward = snapshot.cumulative_reward,
                best = snapshot.best_score,
                phase = %snapshot.phase,
                sps,
                "episode finished"
            ),
        }

        self.last_logged = snapshot.episode;
    }

    fn flush(&mut self) {}
}

/// One CSV row per episode.
pub struct CsvLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CsvLogger {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "episode,total_steps,moves,reward,best_score,phase,updates,critic_loss,actor_loss,mean_q,elapsed_secs"
        )?;

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }
}

impl MetricsLogger for CsvLogger {
    fn log(&mut self, snapshot: &EpisodeSnapshot) {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let (critic, actor, q) = match snapshot.last_update {
            Some(s) => (
                s.critic_loss.to_string(),
                s.actor_loss.to_string(),
                s.mean_q.to_string(),
            ),
            None => Default::default(),
        };

        let _ = writeln!(
            self.writer,
            "{},{},{},{:.4},{:.4},{},{},{},{},{},{:.2}",
            snapshot.episode,
            snapshot.total_steps,
            snapshot.moves,
            snapshot.cumulative_reward,
            snapshot.best_score,
            snapshot.phase,
            snapshot.updates,
            critic,
            actor,
            q,
            elapsed
        );
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Multi-logger that writes to multiple backends.
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, snapshot: &EpisodeSnapshot) {
        for logger in &mut self.loggers {
            logger.log(snapshot);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct Recording(Arc<Mutex<Vec<usize>>>);

    impl MetricsLogger for Recording {
        fn log(&mut self, snapshot: &EpisodeSnapshot) {
            self.0.lock().unwrap().push(snapshot.episode);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_snapshot_builder() {
        let stats = UpdateStats {
            critic_loss: 0.5,
            actor_loss: -1.0,
            mean_q: 1.0,
        };
        let snapshot = EpisodeSnapshot::new(3, 1200, 400, 87.5)
            .with_best_score(90.0)
            .with_phase(Phase::ExploringAndLearning)
            .with_updates(100, Some(stats));

        assert_eq!(snapshot.episode, 3);
        assert_eq!(snapshot.moves, 400);
        assert_eq!(snapshot.best_score, 90.0);
        assert_eq!(snapshot.last_update, Some(stats));
    }

    #[test]
    fn test_console_logger_interval() {
        let mut logger = ConsoleLogger::new(10);
        assert!(!logger.due(5));
        assert!(logger.due(10));
        logger.log(&EpisodeSnapshot::new(10, 1000, 100, 1.0));
        assert!(!logger.due(15));
        assert!(logger.due(20));
    }

    #[test]
    fn test_csv_logger_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episodes.csv");

        {
            let mut logger = CsvLogger::new(&path).unwrap();
            logger.log(&EpisodeSnapshot::new(1, 200, 200, -12.5));
            logger.log(
                &EpisodeSnapshot::new(2, 400, 200, 3.0).with_updates(
                    50,
                    Some(UpdateStats {
                        critic_loss: 0.25,
                        actor_loss: -0.5,
                        mean_q: 0.5,
                    }),
                ),
            );
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("episode,total_steps"));
        assert!(lines[1].starts_with("1,200,200,-12.5000,"));
        assert!(lines[2].contains(",50,0.25,-0.5,0.5,"));
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));
        let mut multi = MultiLogger::new()
            .add(Recording(seen_a.clone()))
            .add(Recording(seen_b.clone()));
        assert_eq!(multi.len(), 2);

        multi.log(&EpisodeSnapshot::new(7, 0, 0, 0.0));
        multi.flush();
        assert_eq!(*seen_a.lock().unwrap(), vec![7]);
        assert_eq!(*seen_b.lock().unwrap(), vec![7]);
    }
}
