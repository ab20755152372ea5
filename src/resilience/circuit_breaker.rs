//! Circuit breaker shared by every call through one executor.
//!
//! # States
//! - Closed: normal operation, attempts pass through
//! - Open: remote assumed down, attempts fail fast with `CircuitOpen`
//! - Half-Open: one trial attempt is allowed through
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive transient failures >= threshold
//! Open → Half-Open: first admission after the break duration
//! Half-Open → Closed: trial attempt succeeds
//! Half-Open → Open: any attempt fails (cooldown restarts)
//! ```
//!
//! Outcomes of attempts admitted before the circuit opened never end the
//! Open state early; only the break duration does.
//!
//! # Design Decisions
//! - All transitions happen under one mutex, never held across an await
//! - Only transient failures count; only a success resets the streak
//! - The trial slot is an RAII admission so a cancelled trial frees it

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::CrsError;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial is allowed.
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            break_duration: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Submit one attempt through the breaker.
    pub async fn call<T, F, Fut>(&self, operation: &str, attempt: F) -> Result<T, CrsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CrsError>>,
    {
        let admission = self.try_acquire().ok_or_else(|| {
            tracing::debug!(breaker = %self.name, operation, "Circuit open, failing fast");
            CrsError::CircuitOpen {
                operation: operation.to_string(),
            }
        })?;

        let result = attempt().await;
        match &result {
            Ok(_) => admission.success(),
            Err(e) if e.is_transient() => admission.failure(),
            Err(_) => admission.neutral(),
        }
        result
    }

    /// Admit an attempt, or `None` while the circuit is open.
    pub fn try_acquire(&self) -> Option<Admission<'_>> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Some(Admission::new(self, false)),
            CircuitState::Open => {
                let cooled = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.break_duration)
                    .unwrap_or(true);
                if !cooled {
                    return None;
                }
                inner.state = CircuitState::HalfOpen;
                inner.trial_in_flight = true;
                drop(inner);
                tracing::info!(breaker = %self.name, "Circuit half-open, admitting trial call");
                metrics::record_circuit_state(&self.name, CircuitState::HalfOpen);
                Some(Admission::new(self, true))
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    return None;
                }
                inner.trial_in_flight = true;
                Some(Admission::new(self, true))
            }
        }
    }

    fn on_success(&self, trial: bool) {
        let mut inner = self.lock();
        let previous = inner.state;
        if previous == CircuitState::Open && !trial {
            // Admitted before the circuit opened; only the cooldown ends Open.
            drop(inner);
            tracing::debug!(breaker = %self.name, "Ignoring late success while open");
            return;
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.trial_in_flight = false;
        drop(inner);

        if previous != CircuitState::Closed {
            tracing::info!(breaker = %self.name, "Circuit closed");
            metrics::record_circuit_state(&self.name, CircuitState::Closed);
        }
    }

    fn on_failure(&self, trial: bool) {
        let mut inner = self.lock();
        if trial || inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.trial_in_flight = false;
            drop(inner);
            tracing::warn!(breaker = %self.name, trial, "Half-open call failed, circuit re-opened");
            metrics::record_circuit_state(&self.name, CircuitState::Open);
            return;
        }

        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        if inner.state != CircuitState::Closed
            || inner.consecutive_failures < self.config.failure_threshold
        {
            return;
        }

        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        let failures = inner.consecutive_failures;
        drop(inner);
        tracing::warn!(
            breaker = %self.name,
            consecutive_failures = failures,
            break_secs = self.config.break_duration.as_secs(),
            "Circuit opened"
        );
        metrics::record_circuit_state(&self.name, CircuitState::Open);
    }

    fn release_trial(&self) {
        self.lock().trial_in_flight = false;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // State stays consistent even if a holder panicked; every write is a whole transition.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Permission to run one attempt. Dropping it unrecorded frees a trial slot.
#[derive(Debug)]
pub struct Admission<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    recorded: bool,
}

impl<'a> Admission<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            recorded: false,
        }
    }

    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn success(mut self) {
        self.recorded = true;
        self.breaker.on_success(self.trial);
    }

    pub fn failure(mut self) {
        self.recorded = true;
        self.breaker.on_failure(self.trial);
    }

    /// Outcome that says nothing about remote health (cancellation, protocol error).
    pub fn neutral(mut self) {
        self.recorded = true;
        if self.trial {
            self.breaker.release_trial();
        }
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.recorded && self.trial {
            self.breaker.release_trial();
        }
    }
}
