//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields: operation, attempt, breaker, ...)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape (optional, CLI only)
//! ```
//!
//! # Design Decisions
//! - Tokens and passwords are never logged; Debug impls redact them
//! - Metrics are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
