//! Per-attempt deadline and cancellation.
//!
//! # Responsibilities
//! - Bound every attempt with a fixed deadline
//! - Race the attempt against caller cancellation
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - An elapsed deadline is a transient `Timeout`, distinct from `Cancelled`

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{CrsError, TransportError};

/// Run `fut` under `deadline`, aborting early if `cancel` fires.
pub async fn run_attempt<T, F>(
    deadline: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, CrsError>
where
    F: Future<Output = Result<T, CrsError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CrsError::Cancelled),
        outcome = tokio::time::timeout(deadline, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(format!(
                "attempt exceeded {}ms",
                deadline.as_millis()
            ))
            .into()),
        },
    }
}

/// Sleep for `delay` unless `cancel` fires first.
pub async fn cancellable_sleep(delay: Duration, cancel: &CancellationToken) -> Result<(), CrsError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CrsError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
