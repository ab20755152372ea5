//! Remote protocol boundary.
//!
//! # Data Flow
//! ```text
//! Facade operation
//!     → envelope.rs (RequestEnvelope: caller identity + correlation id + payload)
//!     → transport.rs (CrsTransport: one async method per remote operation)
//!     → ResponseEnvelope
//!     → fault.rs (business fault → CrsError::RemoteFault)
//! ```
//!
//! # Design Decisions
//! - Serialization of envelopes onto the wire belongs to the stub layer
//!   implementing `CrsTransport`; types here only derive serde so any stub
//!   can reuse them
//! - Optional wire scalars are `Specified<T>`, never collapsed to `Option`
//!   or a default value

pub mod envelope;
pub mod fault;
pub mod operations;
pub mod specified;
pub mod transport;

pub use envelope::{ClientIdentifier, ObjectType, RequestEnvelope, ResponseEnvelope, ServiceIdentifier};
pub use fault::{ensure_no_fault, Fault, FaultCarrier};
pub use specified::Specified;
pub use transport::CrsTransport;
