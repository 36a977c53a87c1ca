//! Retry policy for positional-data fetches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of attempts per fetch (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;
/// Default cap on any single backoff delay.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Default growth factor between consecutive delays.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;
/// Default timeout for one fetch attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 30_000;

/// Exponential backoff parameters, immutable for the life of a run.
///
/// The delay after failed attempt `n` (0-based) is
/// `min(max_delay, initial_delay * multiplier^n)`; with jitter enabled the
/// actual sleep is drawn uniformly from `[delay / 2, delay]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Timeout applied to each individual attempt, not to the whole fetch.
    pub attempt_timeout_ms: u64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
            attempt_timeout_ms: DEFAULT_ATTEMPT_TIMEOUT_MS,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries and never sleeps.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            jitter: false,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Un-jittered backoff after failed attempt `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self.initial_delay_ms as f64 * self.multiplier.powi(exp);
        let capped = scaled.min(self.max_delay_ms as f64);
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_millis(capped as u64)
        } else {
            self.max_delay()
        }
    }

    /// Validate the policy.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be > 0");
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err("retry.multiplier must be >= 1");
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err("retry.max_delay_ms must be >= retry.initial_delay_ms");
        }
        if self.attempt_timeout_ms == 0 {
            return Err("retry.attempt_timeout_ms must be > 0");
        }
        Ok(())
    }
}
