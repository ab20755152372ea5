//! Client facade subsystem.
//!
//! # Data Flow
//! ```text
//! get_person / get_community_people_ids
//!     → session::SessionManager::ensure_token (login via transport, no retry)
//!     → protocol::RequestEnvelope (fresh correlation id, token in header)
//!     → resilience::ResilienceExecutor (retry ⊃ circuit breaker ⊃ deadline)
//!     → protocol::CrsTransport
//!     → protocol::fault::ensure_no_fault
//!     → domain::mapping
//! ```

pub mod crs;
pub mod options;

pub use crs::CrsClient;
pub use options::CrsClientOptions;
