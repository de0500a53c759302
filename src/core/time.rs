//! Fixed-step time accumulation

use std::time::Duration;

/// Longest step a `FixedTimestep` will use, in seconds
pub const MAX_STEP_SECONDS: f32 = 1.0;

const MAX_STEP: Duration = Duration::from_secs(1);

/// Converts variable wall-clock frame times into a whole number of fixed
/// simulation steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Length of one step
    step: Duration,
    /// Time not yet consumed by a step
    accumulator: Duration,
    /// Most steps a single `accumulate` may return
    max_steps: u32,
    /// Steps handed out so far
    total_steps: u64,
}

impl FixedTimestep {
    /// Create an accumulator for steps of `step_seconds`.
    ///
    /// The step is clamped to `(0, MAX_STEP_SECONDS]`; values that are not a
    /// valid duration fall back to the longest step.
    #[must_use]
    pub fn new(step_seconds: f32, max_steps: u32) -> Self {
        let step = Duration::try_from_secs_f32(step_seconds)
            .unwrap_or(MAX_STEP)
            .clamp(Duration::from_nanos(1), MAX_STEP);

        Self {
            step,
            accumulator: Duration::ZERO,
            max_steps: max_steps.max(1),
            total_steps: 0,
        }
    }

    /// Step length in seconds
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Steps handed out so far
    #[must_use]
    pub const fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Fraction of a step waiting in the accumulator, in `[0, 1)`
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }

    /// Add `elapsed` wall-clock time and return how many steps to run.
    ///
    /// When more than `max_steps` are owed, the backlog beyond that is
    /// discarded so a stall does not snowball.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.accumulator = self.accumulator.saturating_add(elapsed);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            let behind = self.accumulator.as_nanos() / self.step.as_nanos();
            log::debug!("Dropping {behind} simulation steps of backlog");
            self.accumulator = Duration::from_nanos(
                (self.accumulator.as_nanos() % self.step.as_nanos()) as u64,
            );
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Record one step taken outside `accumulate`
    pub fn count_step(&mut self) {
        self.total_steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_whole_steps() {
        let mut time = FixedTimestep::new(0.25, 8);

        assert_eq!(time.accumulate(Duration::from_millis(100)), 0);
        assert_eq!(time.accumulate(Duration::from_millis(200)), 1);
        assert_eq!(time.accumulate(Duration::from_millis(500)), 2);
        assert_eq!(time.total_steps(), 3);
        assert!(time.alpha() < 1.0);
    }

    #[test]
    fn test_accumulate_caps_backlog() {
        let mut time = FixedTimestep::new(0.25, 2);

        assert_eq!(time.accumulate(Duration::from_secs(10)), 2);
        assert!(time.alpha() < 1.0);
        assert_eq!(time.accumulate(Duration::ZERO), 0);
    }

    #[test]
    fn test_count_step() {
        let mut time = FixedTimestep::new(0.5, 1);
        time.count_step();
        assert_eq!(time.total_steps(), 1);
        assert_eq!(time.delta(), 0.5);
    }

    #[test]
    fn test_step_clamped_to_valid_duration() {
        assert_eq!(FixedTimestep::new(1e30, 4).delta(), MAX_STEP_SECONDS);
        assert_eq!(FixedTimestep::new(f32::NAN, 4).delta(), MAX_STEP_SECONDS);
        assert!(FixedTimestep::new(1e-12, 4).delta() > 0.0);

        let mut time = FixedTimestep::new(1e30, 4);
        assert_eq!(time.accumulate(Duration::MAX), 4);
    }
}
