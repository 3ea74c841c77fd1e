//! Per-episode reward history and its text rendering.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Ordered cumulative rewards, one entry per finished episode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardHistory {
    rewards: Vec<f32>,
}

impl RewardHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reward: f32) {
        self.rewards.push(reward);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.rewards
    }

    pub fn last(&self) -> Option<f32> {
        self.rewards.last().copied()
    }

    /// Mean of the most recent `n` episodes (fewer if not available).
    pub fn mean_last(&self, n: usize) -> Option<f32> {
        if self.rewards.is_empty() || n == 0 {
            return None;
        }
        let tail = &self.rewards[self.rewards.len().saturating_sub(n)..];
        Some(tail.iter().sum::<f32>() / tail.len() as f32)
    }

    /// Highest episode reward.
    pub fn best(&self) -> Option<f32> {
        self.rewards.iter().copied().reduce(f32::max)
    }

    /// Draw the history as a `width x height` character chart.
    ///
    /// Episodes are grouped into `width` buckets and each column marks its
    /// bucket mean.
    pub fn render_ascii(&self, width: usize, height: usize) -> String {
        if self.rewards.is_empty() {
            return "no episodes recorded\n".to_string();
        }
        let width = width.clamp(1, self.rewards.len());
        let height = height.max(2);

        let columns: Vec<f32> = (0..width)
            .map(|c| {
                let start = c * self.rewards.len() / width;
                let end = ((c + 1) * self.rewards.len() / width).max(start + 1);
                let bucket = &self.rewards[start..end];
                bucket.iter().sum::<f32>() / bucket.len() as f32
            })
            .collect();

        let lo = columns.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = columns.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = if hi > lo { hi - lo } else { 1.0 };

        let mut grid = vec![vec![' '; width]; height];
        for (c, &v) in columns.iter().enumerate() {
            let level = ((v - lo) / span * (height - 1) as f32).round() as usize;
            grid[height - 1 - level.min(height - 1)][c] = '*';
        }

        let mut out = String::new();
        for (r, row) in grid.iter().enumerate() {
            let label = if r == 0 {
                format!("{:>10.2}", hi)
            } else if r == height - 1 {
                format!("{:>10.2}", lo)
            } else {
                " ".repeat(10)
            };
            out.push_str(&label);
            out.push_str(" |");
            out.extend(row.iter());
            out.push('\n');
        }
        out.push_str(&" ".repeat(11));
        out.push('+');
        out.push_str(&"-".repeat(width));
        out.push('\n');
        out.push_str(&format!(
            "{:>12}episodes 1..{} (mean last 100: {:.2})\n",
            "",
            self.rewards.len(),
            self.mean_last(100).unwrap_or_default()
        ));
        out
    }

    /// Write `episode,reward` rows.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "episode,reward")?;
        for (i, r) in self.rewards.iter().enumerate() {
            writeln!(writer, "{},{}", i + 1, r)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl From<Vec<f32>> for RewardHistory {
    fn from(rewards: Vec<f32>) -> Self {
        Self { rewards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_statistics() {
        let history = RewardHistory::from(vec![1.0, 5.0, -2.0, 4.0]);
        assert_eq!(history.len(), 4);
        assert_eq!(history.best(), Some(5.0));
        assert_eq!(history.last(), Some(4.0));
        assert_eq!(history.mean_last(2), Some(1.0));
        assert_eq!(history.mean_last(100), Some(2.0));
        assert_eq!(history.mean_last(0), None);

        let empty = RewardHistory::new();
        assert_eq!(empty.best(), None);
        assert_eq!(empty.mean_last(5), None);
    }

    #[test]
    fn test_render_ascii_shape() {
        let history = RewardHistory::from((0..50).map(|i| i as f32).collect::<Vec<_>>());
        let chart = history.render_ascii(20, 8);
        let lines: Vec<&str> = chart.lines().collect();

        // 8 grid rows, axis, caption
        assert_eq!(lines.len(), 10);
        assert!(lines[0].contains('*'));
        assert!(lines[7].contains('*'));
        assert_eq!(chart.matches('*').count(), 20);
        assert!(lines[9].contains("episodes 1..50"));
    }

    #[test]
    fn test_render_ascii_narrow_history() {
        let history = RewardHistory::from(vec![3.0, 3.0]);
        let chart = history.render_ascii(40, 5);
        assert_eq!(chart.matches('*').count(), 2);

        assert_eq!(RewardHistory::new().render_ascii(10, 5), "no episodes recorded\n");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rewards.csv");
        RewardHistory::from(vec![1.5, -2.0]).write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "episode,reward\n1,1.5\n2,-2\n");
    }
}
