//! Error taxonomy for the CRS client.
//!
//! # Failure Classes
//! ```text
//! TransportError (kind tagged once at the transport boundary)
//!     Timeout | Communication  → transient: retried, counted by the breaker
//!                                (HTTP 408, 429 and 5xx land here)
//!     Protocol                 → terminal (other HTTP statuses)
//! CircuitOpen                  → terminal, raised without touching the transport
//! RemoteFault                  → terminal, transport succeeded but payload faulted
//! Authentication               → login succeeded but no usable token
//! Configuration                → raised while building the transport
//! Cancelled                    → caller cancelled mid-call or mid-backoff
//! ```
//!
//! Callers branch on these variants to decide between "retry later",
//! "fix configuration" and "business rejection".

use std::fmt;

/// Category attached to every failure raised by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The attempt exceeded its deadline.
    Timeout,
    /// Connection refused/reset, TLS failure, broken stream.
    Communication,
    /// The peer answered with something the stub layer could not decode.
    Protocol,
}

impl FailureKind {
    pub fn is_transient(self) -> bool {
        matches!(self, FailureKind::Timeout | FailureKind::Communication)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Communication => "communication",
            FailureKind::Protocol => "protocol",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by the transport layer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} failure: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }

    pub fn communication(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Communication, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Protocol, message)
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if let Some(status) = err.status() {
            kind_for_status(status)
        } else if err.is_decode() || err.is_builder() {
            FailureKind::Protocol
        } else {
            FailureKind::Communication
        };
        Self::new(kind, err.to_string())
    }
}

/// Busy or failing peers (408, 429, 5xx) are worth retrying; other statuses are not.
pub fn kind_for_status(status: reqwest::StatusCode) -> FailureKind {
    if status.is_server_error()
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
    {
        FailureKind::Communication
    } else {
        FailureKind::Protocol
    }
}

/// Errors surfaced by every public client operation.
#[derive(Debug, thiserror::Error)]
pub enum CrsError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("circuit open; {operation} was not attempted")]
    CircuitOpen { operation: String },

    #[error("remote fault in {operation}: {code} - {}", .message.as_deref().unwrap_or(""))]
    RemoteFault {
        operation: String,
        code: String,
        message: Option<String>,
    },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl CrsError {
    /// Only timeouts and communication failures qualify for retry and breaker accounting.
    pub fn is_transient(&self) -> bool {
        matches!(self, CrsError::Transport(e) if e.is_transient())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CrsError::Configuration(message.into())
    }

    /// Short label used for metrics and structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            CrsError::Transport(e) => e.kind.as_str(),
            CrsError::CircuitOpen { .. } => "circuit_open",
            CrsError::RemoteFault { .. } => "remote_fault",
            CrsError::Authentication(_) => "authentication",
            CrsError::Configuration(_) => "configuration",
            CrsError::Cancelled => "cancelled",
        }
    }
}

pub type CrsResult<T> = Result<T, CrsError>;
