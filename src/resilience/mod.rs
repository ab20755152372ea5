//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Idempotent remote call:
//!     → retries.rs (outer: retry transient failures with backoff.rs delays)
//!     → circuit_breaker.rs (inner: fail fast while the remote is down)
//!     → timeouts.rs (per-attempt deadline, cancellation)
//!     → executor.rs composes the three
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline
//! - Retries only for idempotent reads, never for login
//! - Classification is `CrsError::is_transient`, decided once at the transport boundary
//! - Retry and breaker are separate decorators, composed explicitly

pub mod backoff;
pub mod circuit_breaker;
pub mod executor;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use executor::ResilienceExecutor;
pub use retries::{RetryPolicy, RetryPolicyConfig};
