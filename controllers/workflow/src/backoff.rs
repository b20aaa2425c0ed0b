//! # Exponential Backoff
//!
//! Paces repeated status polls of a running automation job. The interval
//! doubles on each poll up to a configured ceiling and is reset whenever a
//! job enters a new lifecycle phase, so each tracking cycle starts from the
//! initial interval. Never applied to permanent-failure paths.

use std::time::Duration;

/// Exponential backoff calculator
///
/// Generates monotonically non-decreasing wait intervals: the first call
/// returns the initial interval, each subsequent call doubles it, capped at
/// the configured maximum.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Initial interval (for reset)
    initial: Duration,
    /// Interval returned by the next call
    current: Duration,
    /// Ceiling the interval never exceeds
    max: Duration,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with the given initial interval
    /// and ceiling
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max,
        }
    }

    /// Get the next wait interval and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        self.current = std::cmp::min(self.current.saturating_mul(2), self.max);
        result
    }

    /// Reset the backoff to the initial interval
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_sequence() {
        let mut backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10));

        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(4));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(8));
    }

    #[test]
    fn test_exponential_backoff_max_cap() {
        let mut backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10));

        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(4));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(8));
        // Next would be 16s, but should be capped at 10s
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
        // Should stay at max
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
    }

    #[test]
    fn test_exponential_backoff_reset() {
        let mut backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(10));

        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(4));

        backoff.reset();

        // Should restart from the initial interval after a phase change
        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
    }
}
