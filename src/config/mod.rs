//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (CRS_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → CrsConfig (validated, immutable)
//!     → consumed once by the transport builder and the client
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets come from the file or environment; the client only sees resolved values

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CrsConfig;
pub use schema::{MtlsConfig, ResilienceConfig, SessionConfig, TransportConfig};
