//! Fixed-interval tick driver.

use std::time::Duration;

/// Converts wall-clock elapsed time into whole simulation steps.
///
/// Leftover time below one step carries into the next advance. Time beyond
/// the substep cap is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    step: Duration,
    max_substeps: u32,
    accumulator: Duration,
}

impl FixedClock {
    /// Creates a clock producing steps of `step`, at most `max_substeps` per
    /// advance.
    #[must_use]
    pub const fn new(step: Duration, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps,
            accumulator: Duration::ZERO,
        }
    }

    /// Duration of a single simulation step.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Time accumulated toward the next step.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Feeds `elapsed` into the clock and returns how many steps to run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.step.is_zero() {
            return 0;
        }
        self.accumulator = self.accumulator.saturating_add(elapsed);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Discards any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_steps_carry_over() {
        let mut clock = FixedClock::new(Duration::from_millis(50), 8);
        assert_eq!(clock.advance(Duration::from_millis(30)), 0);
        assert_eq!(clock.advance(Duration::from_millis(30)), 1);
        assert_eq!(clock.pending(), Duration::from_millis(10));
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = FixedClock::new(Duration::from_millis(50), 8);
        assert_eq!(clock.advance(Duration::from_secs(5)), 8);
        assert_eq!(clock.pending(), Duration::ZERO);
    }

    #[test]
    fn zero_step_never_ticks() {
        let mut clock = FixedClock::new(Duration::ZERO, 8);
        assert_eq!(clock.advance(Duration::from_secs(1)), 0);
    }
}
