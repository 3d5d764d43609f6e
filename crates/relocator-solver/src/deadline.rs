//! Time-based termination of the relocation search.

use std::time::{Duration, Instant};

use relocator_core::{RelocationError, Result};

/// Number of combinations between two clock samples.
pub const DEFAULT_CHECK_INTERVAL: u128 = 100_000;

/// Aborts a search once a wall-clock limit is exceeded.
///
/// The clock is only sampled every `check_interval` iterations, so a search
/// may overshoot the limit by at most one interval of work.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use relocator_solver::deadline::Deadline;
///
/// let deadline = Deadline::new(Duration::from_secs(160));
/// assert!(deadline.check(0).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Deadline {
    limit: Duration,
    started: Instant,
    check_interval: u128,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: Instant::now(),
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn with_check_interval(mut self, interval: u128) -> Self {
        self.check_interval = interval.max(1);
        self
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns true if `iteration` is one at which the clock is sampled.
    pub fn is_checkpoint(&self, iteration: u128) -> bool {
        iteration % self.check_interval == 0
    }

    /// Samples the clock at checkpoints.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::Timeout`] if a checkpoint is reached after
    /// the limit has elapsed.
    pub fn check(&self, iteration: u128) -> Result<()> {
        if self.is_checkpoint(iteration) && self.elapsed() > self.limit {
            return Err(RelocationError::Timeout { limit: self.limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_between_checkpoints_is_free() {
        let deadline = Deadline::new(Duration::ZERO).with_check_interval(10);
        std::thread::sleep(Duration::from_millis(2));

        assert!(deadline.check(5).is_ok());
        let err = deadline.check(10).unwrap_err();
        assert_eq!(err.status_code(), 508);
    }

    #[test]
    fn test_within_budget() {
        let deadline = Deadline::seconds(60);
        assert!(deadline.check(0).is_ok());
        assert!(deadline.check(DEFAULT_CHECK_INTERVAL).is_ok());
    }

    #[test]
    fn test_zero_interval_clamped() {
        let deadline = Deadline::millis(1).with_check_interval(0);
        assert!(deadline.is_checkpoint(7));
    }
}
