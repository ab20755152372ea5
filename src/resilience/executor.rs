//! Retry + circuit breaker composition.
//!
//! ```text
//! execute(op)
//!     → RetryPolicy (outer: up to N attempts, backoff between them)
//!         → CircuitBreaker (inner: admits or rejects each attempt)
//!             → run_attempt (per-attempt deadline, cancellation)
//!                 → op()
//! ```

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::schema::ResilienceConfig;
use crate::error::CrsError;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::resilience::retries::{RetryPolicy, RetryPolicyConfig};
use crate::resilience::timeouts::run_attempt;

/// Executes idempotent calls. One instance is shared by every call of a client,
/// so breaker state spans calls.
#[derive(Debug)]
pub struct ResilienceExecutor {
    retry: RetryPolicy,
    breaker: CircuitBreaker,
    attempt_timeout: Duration,
}

impl ResilienceExecutor {
    pub fn new(retry: RetryPolicy, breaker: CircuitBreaker, attempt_timeout: Duration) -> Self {
        Self {
            retry,
            breaker,
            attempt_timeout,
        }
    }

    pub fn from_config(name: &str, config: &ResilienceConfig) -> Self {
        Self::new(
            RetryPolicy::new(RetryPolicyConfig {
                max_attempts: config.max_attempts,
                base_delay: Duration::from_millis(config.base_delay_ms),
                max_delay: Duration::from_millis(config.max_delay_ms),
                jitter_ratio: config.jitter_ratio,
            }),
            CircuitBreaker::new(
                name,
                CircuitBreakerConfig {
                    failure_threshold: config.failure_threshold,
                    break_duration: Duration::from_secs(config.break_duration_secs),
                },
            ),
            Duration::from_secs(config.attempt_timeout_secs),
        )
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `op` with retry outside and the breaker inside.
    ///
    /// `op` must be idempotent: it may be invoked up to `max_attempts` times.
    /// The future it returns is only polled once the breaker admits it.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, CrsError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CrsError>>,
    {
        let breaker = &self.breaker;
        let deadline = self.attempt_timeout;
        self.retry
            .run(operation, cancel, |attempt| {
                let fut = op();
                async move {
                    tracing::trace!(operation, attempt, "Submitting attempt");
                    breaker
                        .call(operation, || run_attempt(deadline, cancel, fut))
                        .await
                }
            })
            .await
    }
}

impl Default for ResilienceExecutor {
    fn default() -> Self {
        Self::from_config("crs", &ResilienceConfig::default())
    }
}
