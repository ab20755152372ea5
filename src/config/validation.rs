//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required identity fields present
//! - Base URL parses; scheme policy
//! - Value ranges (timeouts > 0, attempts >= 1, jitter in [0, 1])
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: CrsConfig → Result<(), Vec<ValidationError>>
//! - Certificate files are not opened here; that happens once at transport build

use url::Url;

use crate::config::schema::CrsConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("invalid base_url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("insecure endpoint '{0}' requires allow_insecure_http = true")]
    InsecureEndpoint(String),

    #[error("mtls is configured but '{0}' is plaintext; the client identity would never be presented")]
    MtlsOverPlaintext(String),

    #[error("{field} out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

pub fn validate_config(config: &CrsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let client = &config.client;
    for (name, value) in [
        ("client.consumer", &client.consumer),
        ("client.producer", &client.producer),
        ("client.service_subsystem_code", &client.service_subsystem_code),
        ("client.protocol_version", &client.protocol_version),
        ("client.username", &client.username),
        ("client.password", &client.password),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::MissingField(name));
        }
    }

    let transport = &config.transport;
    match Url::parse(&transport.base_url) {
        Ok(url) => match url.scheme() {
            "https" => {}
            "http" if transport.allow_insecure_http => {}
            "http" => errors.push(ValidationError::InsecureEndpoint(transport.base_url.clone())),
            other => errors.push(ValidationError::InvalidUrl {
                url: transport.base_url.clone(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        },
        Err(e) => errors.push(ValidationError::InvalidUrl {
            url: transport.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if transport.request_timeout_secs == 0 {
        errors.push(out_of_range("transport.request_timeout_secs", "must be > 0"));
    }
    if transport.connect_timeout_secs == 0 {
        errors.push(out_of_range("transport.connect_timeout_secs", "must be > 0"));
    }

    if let Some(mtls) = &transport.mtls {
        if mtls.client_pfx_path.trim().is_empty() {
            errors.push(ValidationError::MissingField("transport.mtls.client_pfx_path"));
        }
        if mtls.server_cert_path.trim().is_empty() {
            errors.push(ValidationError::MissingField("transport.mtls.server_cert_path"));
        }
        if transport.base_url.trim_start().to_ascii_lowercase().starts_with("http://") {
            errors.push(ValidationError::MtlsOverPlaintext(transport.base_url.clone()));
        }
    }

    let resilience = &config.resilience;
    if resilience.max_attempts == 0 {
        errors.push(out_of_range("resilience.max_attempts", "must be >= 1"));
    }
    if resilience.failure_threshold == 0 {
        errors.push(out_of_range("resilience.failure_threshold", "must be >= 1"));
    }
    if resilience.attempt_timeout_secs == 0 {
        errors.push(out_of_range("resilience.attempt_timeout_secs", "must be > 0"));
    }
    if !(0.0..=1.0).contains(&resilience.jitter_ratio) {
        errors.push(out_of_range("resilience.jitter_ratio", "must be within [0, 1]"));
    }
    if resilience.max_delay_ms < resilience.base_delay_ms {
        errors.push(out_of_range("resilience.max_delay_ms", "must be >= base_delay_ms"));
    }

    if config.session.default_lifetime_secs <= config.session.refresh_skew_secs {
        errors.push(out_of_range(
            "session.default_lifetime_secs",
            "must exceed refresh_skew_secs",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn out_of_range(field: &'static str, reason: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field,
        reason: reason.to_string(),
    }
}
