//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! TransportConfig
//!     → transport.rs (scheme policy, timeouts, TLS selection)
//!     → tls.rs (PKCS#12 identity, single-root verifier, leaf pin)
//!     → rest.rs (RestClient bound to the base URL)
//! ```
//!
//! # Design Decisions
//! - Platform trust is never consulted when mutual TLS is configured
//! - Chain validation runs before the pin; both must pass
//! - Every load failure surfaces as `CrsError::Configuration`

pub mod rest;
pub mod tls;
pub mod transport;

pub use rest::RestClient;
pub use tls::{fingerprint, pin_by_fingerprints, LeafPin, PinnedRootVerifier};
pub use transport::build_transport;
