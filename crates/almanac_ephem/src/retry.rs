//! Fetch with exponential backoff, per-attempt timeout and cancellation.

use std::time::Duration;

use almanac_config::RetryPolicy;
use almanac_core::{Minute, Sample};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::EphemError;
use crate::source::{FetchRequest, PositionSource};

/// Successful fetch plus the number of attempts it took.
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    pub samples: Vec<(Minute, Sample)>,
    pub attempts: u32,
}

/// Sleep before retrying after failed attempt `attempt` (0-based).
///
/// With jitter the delay is drawn uniformly from `[delay / 2, delay]`.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let delay = policy.delay_for_attempt(attempt);
    if !policy.jitter || delay.is_zero() {
        return delay;
    }
    let ms = delay.as_millis() as u64;
    Duration::from_millis(rand::rng().random_range(ms / 2..=ms))
}

/// Run `request` against `source` until it succeeds, a permanent error is
/// reported, attempts run out, or `cancel` fires.
pub(crate) async fn fetch_with_retry<S: PositionSource + ?Sized>(
    source: &S,
    request: &FetchRequest,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<FetchOutcome, EphemError> {
    let mut last_error = String::from("no attempt made");
    let mut attempts = 0;

    for attempt in 0..policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(EphemError::Cancelled);
        }
        attempts = attempt + 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EphemError::Cancelled),
            r = tokio::time::timeout(policy.attempt_timeout(), source.fetch(request)) => r,
        };

        match result {
            Ok(Ok(samples)) => {
                debug!(
                    body = %request.body,
                    range = %request.range,
                    attempts,
                    samples = samples.len(),
                    "fetch succeeded"
                );
                return Ok(FetchOutcome { samples, attempts });
            }
            Ok(Err(e)) => {
                warn!(
                    body = %request.body,
                    range = %request.range,
                    attempt = attempts,
                    retryable = e.retryable,
                    error = %e,
                    "fetch attempt failed"
                );
                let retryable = e.retryable;
                last_error = e.message;
                if !retryable {
                    break;
                }
            }
            Err(_) => {
                warn!(
                    body = %request.body,
                    range = %request.range,
                    attempt = attempts,
                    timeout_ms = policy.attempt_timeout_ms,
                    "fetch attempt timed out"
                );
                last_error = format!("attempt timed out after {} ms", policy.attempt_timeout_ms);
            }
        }

        if attempts < policy.max_attempts {
            let delay = backoff_delay(policy, attempt);
            debug!(delay_ms = delay.as_millis() as u64, "backoff before retry");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EphemError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    Err(EphemError::FetchExhausted {
        body: request.body,
        range: request.range,
        attempts,
        last_error,
    })
}
