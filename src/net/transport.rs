//! Transport construction from configuration.
//!
//! # Design Decisions
//! - With `mtls` configured, trust is the configured root only and the client
//!   presents its PKCS#12 identity
//! - Without it, `https://` uses the bundled webpki roots
//! - `http://` needs an explicit `allow_insecure_http`, which is logged loudly,
//!   and is never combined with `mtls`

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::config::schema::{TlsVersion, TransportConfig};
use crate::error::CrsError;
use crate::net::rest::RestClient;
use crate::net::tls::{
    build_client_tls_config, load_client_identity, load_trusted_root, pin_by_fingerprints,
};
use crate::observability::logging::SECURITY_TARGET;

/// Build the REST client described by `config`.
pub fn build_transport(config: &TransportConfig) -> Result<RestClient, CrsError> {
    let base_url = Url::parse(&config.base_url)
        .map_err(|e| CrsError::configuration(format!("invalid base_url '{}': {}", config.base_url, e)))?;

    match base_url.scheme() {
        "https" => {}
        "http" if config.mtls.is_some() => {
            return Err(CrsError::configuration(format!(
                "mtls is configured but endpoint '{}' is plaintext",
                base_url
            )));
        }
        "http" if config.allow_insecure_http => {
            tracing::warn!(
                target: SECURITY_TARGET,
                url = %base_url,
                "Plaintext HTTP transport enabled; traffic is not encrypted or authenticated"
            );
        }
        "http" => {
            return Err(CrsError::configuration(format!(
                "plaintext endpoint '{}' rejected; set allow_insecure_http to override",
                base_url
            )));
        }
        other => {
            return Err(CrsError::configuration(format!("unsupported URL scheme '{}'", other)));
        }
    }

    let builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    let builder = match &config.mtls {
        Some(mtls) => {
            let identity = load_client_identity(Path::new(&mtls.client_pfx_path), &mtls.client_pfx_password)?;
            let root = load_trusted_root(Path::new(&mtls.server_cert_path))?;
            let pin = pin_by_fingerprints(&mtls.pinned_fingerprints);
            let tls = build_client_tls_config(identity, root, pin, config.min_tls_version)?;

            tracing::info!(
                pinned = mtls.pinned_fingerprints.len(),
                min_tls = ?config.min_tls_version,
                "Mutual TLS transport configured"
            );
            builder.use_preconfigured_tls(tls)
        }
        None => builder.use_rustls_tls().min_tls_version(match config.min_tls_version {
            TlsVersion::Tls12 => reqwest::tls::Version::TLS_1_2,
            TlsVersion::Tls13 => reqwest::tls::Version::TLS_1_3,
        }),
    };

    let builder = if base_url.scheme() == "https" {
        builder.https_only(true)
    } else {
        builder
    };

    let http = builder
        .build()
        .map_err(|e| CrsError::configuration(format!("failed to build HTTP client: {}", e)))?;

    Ok(RestClient::new(http, base_url))
}
