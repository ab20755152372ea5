//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::client::CrsClientOptions;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CrsConfig {
    /// Caller identity and login credentials.
    pub client: CrsClientOptions,

    /// Endpoint and TLS trust settings.
    pub transport: TransportConfig,

    /// Retry and circuit breaker settings.
    pub resilience: ResilienceConfig,

    /// Session token lifetime settings.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Minimum accepted TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum TlsVersion {
    #[default]
    #[serde(rename = "1.2")]
    Tls12,
    #[serde(rename = "1.3")]
    Tls13,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base address of the remote service (must be https unless overridden).
    pub base_url: String,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// TLS version floor.
    pub min_tls_version: TlsVersion,

    /// Permit a plaintext endpoint. Local development only.
    pub allow_insecure_http: bool,

    /// Mutual TLS material. Without it, https uses the default web PKI roots.
    pub mtls: Option<MtlsConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8443".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            min_tls_version: TlsVersion::Tls12,
            allow_insecure_http: false,
            mtls: None,
        }
    }
}

/// Mutual TLS material.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MtlsConfig {
    /// Client certificate bundle (PKCS#12).
    pub client_pfx_path: String,

    /// Password for the bundle; empty if none.
    pub client_pfx_password: String,

    /// The single trusted server root/issuer certificate (PEM or DER).
    pub server_cert_path: String,

    /// Optional SHA-256 fingerprints the server leaf must match.
    pub pinned_fingerprints: Vec<String>,
}

impl std::fmt::Debug for MtlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MtlsConfig")
            .field("client_pfx_path", &self.client_pfx_path)
            .field("client_pfx_password", &"<redacted>")
            .field("server_cert_path", &self.server_cert_path)
            .field("pinned_fingerprints", &self.pinned_fingerprints)
            .finish()
    }
}

/// Retry and circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Total attempts per idempotent call, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Random jitter as a fraction of each delay (0.0 disables).
    pub jitter_ratio: f64,

    /// Consecutive transient failures that open the circuit.
    pub failure_threshold: u32,

    /// Seconds the circuit stays open before a trial call.
    pub break_duration_secs: u64,

    /// Deadline for a single attempt in seconds.
    pub attempt_timeout_secs: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
            jitter_ratio: 0.0,
            failure_threshold: 5,
            break_duration_secs: 30,
            attempt_timeout_secs: 30,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// A token expiring within this many seconds is treated as expired.
    pub refresh_skew_secs: u64,

    /// Lifetime assumed when login reports no expiry.
    pub default_lifetime_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_skew_secs: 60,
            default_lifetime_secs: 3600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,

    /// Prometheus exporter bind address; disabled when absent.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_address: None,
        }
    }
}
