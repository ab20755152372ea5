//! Resilient authenticated client for the CRS people registry.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod resilience;
pub mod session;

pub use client::{CrsClient, CrsClientOptions};
pub use config::schema::CrsConfig;
pub use domain::{PersonDto, PersonIdsDto};
pub use error::{CrsError, CrsResult, FailureKind, TransportError};
pub use net::{build_transport, RestClient};
pub use protocol::CrsTransport;
pub use resilience::CircuitState;
