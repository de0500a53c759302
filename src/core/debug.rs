//! Pool statistics module

use std::fmt;

use crate::pool::SweepReport;

/// Running totals over every sweep of a simulation
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Sweeps recorded
    steps: u64,
    /// Entity advances across all sweeps
    advanced: u64,
    /// Entities returned to their pools by sweeps
    reclaimed: u64,
    /// Invalid entities dropped by sweeps
    dropped: u64,
    /// Spawns refused
    spawn_failures: u64,
    /// Largest active set seen after a sweep
    peak_active: usize,
    /// Most recent sweep
    last: SweepReport,
}

impl PoolStats {
    /// Create an empty stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one sweep
    pub fn record_sweep(&mut self, report: SweepReport) {
        self.steps += 1;
        self.advanced += report.advanced as u64;
        self.reclaimed += report.reclaimed as u64;
        self.dropped += report.dropped as u64;
        // Entities reclaimed this step were active going in
        self.peak_active = self
            .peak_active
            .max(report.active + report.reclaimed + report.dropped);
        self.last = report;
    }

    /// Record a refused spawn
    pub fn record_spawn_failure(&mut self) {
        self.spawn_failures += 1;
    }

    /// Sweeps recorded
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Entities returned to their pools by sweeps
    pub fn reclaimed(&self) -> u64 {
        self.reclaimed
    }

    /// Invalid entities dropped by sweeps
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Entity advances across all sweeps
    pub fn advanced(&self) -> u64 {
        self.advanced
    }

    /// Spawns refused
    pub fn spawn_failures(&self) -> u64 {
        self.spawn_failures
    }

    /// Largest active set seen
    pub fn peak_active(&self) -> usize {
        self.peak_active
    }

    /// Most recent sweep
    pub fn last_sweep(&self) -> SweepReport {
        self.last
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "steps: {} | active: {} (peak {}) | reclaimed: {} | dropped: {} | refused: {}",
            self.steps,
            self.last.active,
            self.peak_active,
            self.reclaimed,
            self.dropped,
            self.spawn_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sweeps() {
        let mut stats = PoolStats::new();
        stats.record_sweep(SweepReport {
            advanced: 5,
            reclaimed: 2,
            dropped: 1,
            active: 3,
        });
        stats.record_sweep(SweepReport {
            advanced: 3,
            reclaimed: 3,
            dropped: 0,
            active: 0,
        });

        assert_eq!(stats.steps(), 2);
        assert_eq!(stats.advanced(), 8);
        assert_eq!(stats.reclaimed(), 5);
        assert_eq!(stats.dropped(), 1);
        assert_eq!(stats.peak_active(), 6);
        assert_eq!(stats.last_sweep().active, 0);
    }

    #[test]
    fn test_display() {
        let mut stats = PoolStats::new();
        stats.record_spawn_failure();
        assert!(stats.to_string().contains("refused: 1"));
    }
}
