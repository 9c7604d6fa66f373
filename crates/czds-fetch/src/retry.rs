//! Retry policy with exponential backoff.

use std::time::Duration;

/// How many times a download is attempted and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never waits between attempts.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Returns true if another attempt may follow `attempt` (1-based).
    #[must_use]
    pub const fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after the given failed attempt (1-based).
    ///
    /// `base_delay * 2^(attempt - 1)` with a deterministic ±25% jitter so
    /// parallel tasks do not retry in lockstep. The result never exceeds
    /// `max_delay`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }

        let exp = attempt.saturating_sub(1).min(16);
        let max_ms = self.max_delay.as_millis() as u64;
        let capped = base_ms.saturating_mul(1u64 << exp).min(max_ms);

        // Jitter in [-25%, +25%) derived from the attempt number
        let range = capped / 4;
        if range == 0 {
            return Duration::from_millis(capped);
        }
        let offset = (u64::from(attempt) * 7919) % (range * 2);
        Duration::from_millis((capped - range + offset).min(max_ms))
    }
}
