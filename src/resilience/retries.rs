//! Retry logic.
//!
//! # Responsibilities
//! - Re-run an idempotent attempt after transient failures
//! - Wait an exponential backoff between attempts
//! - Stop immediately on cancellation or any non-transient error
//!
//! # Design Decisions
//! - Only ever wraps idempotent reads; login is never retried
//! - `CircuitOpen` is not transient, so a tripped breaker ends the sequence

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::CrsError;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::cancellable_sleep;

#[derive(Debug, Clone)]
pub struct RetryPolicyConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of each delay added as random jitter (0 disables).
    pub jitter_ratio: f64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            jitter_ratio: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryPolicyConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryPolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryPolicyConfig {
        &self.config
    }

    /// Delay to wait before `attempt` (1-based). Zero for the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt.saturating_sub(1),
            self.config.base_delay.as_millis() as u64,
            self.config.max_delay.as_millis() as u64,
            self.config.jitter_ratio,
        )
    }

    /// Run `attempt` until it succeeds, fails terminally, or attempts run out.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<T, CrsError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CrsError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut current = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(CrsError::Cancelled);
            }

            match attempt(current).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && current < max_attempts => {
                    let delay = self.delay_before(current + 1);
                    tracing::warn!(
                        operation,
                        attempt = current,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    metrics::record_retry(operation);
                    cancellable_sleep(delay, cancel).await?;
                    current += 1;
                }
                Err(err) => {
                    if err.is_transient() {
                        tracing::warn!(operation, attempts = current, error = %err, "Retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }
}
