//! TLS configuration and certificate loading.
//!
//! # Responsibilities
//! - Load the client identity from a PKCS#12 bundle
//! - Load the single trusted root (PEM or DER)
//! - Validate server chains against that root only, then apply the leaf pin
//!
//! No revocation checking is performed.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use sha2::{Digest, Sha256};

use crate::config::schema::TlsVersion;
use crate::error::CrsError;
use crate::observability::logging::SECURITY_TARGET;

/// Client certificate chain plus its private key.
pub struct ClientIdentity {
    pub chain: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("chain_len", &self.chain.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Load the client identity from a PKCS#12 file.
pub fn load_client_identity(path: &Path, password: &str) -> Result<ClientIdentity, CrsError> {
    if !path.exists() {
        return Err(CrsError::configuration(format!(
            "client certificate bundle not found: {:?}",
            path
        )));
    }
    let data = std::fs::read(path).map_err(|e| {
        CrsError::configuration(format!("failed to read client certificate bundle {:?}: {}", path, e))
    })?;
    client_identity_from_pkcs12(&data, password)
}

/// Parse a PKCS#12 bundle; the first private key entry wins.
pub fn client_identity_from_pkcs12(data: &[u8], password: &str) -> Result<ClientIdentity, CrsError> {
    let store = p12_keystore::KeyStore::from_pkcs12(data, password)
        .map_err(|e| CrsError::configuration(format!("invalid client certificate bundle: {}", e)))?;

    let (alias, entry) = store.private_key_chain().ok_or_else(|| {
        CrsError::configuration("client certificate bundle has no private key entry")
    })?;

    let chain: Vec<CertificateDer<'static>> = entry
        .chain()
        .iter()
        .map(|c| CertificateDer::from(c.as_der().to_vec()))
        .collect();
    if chain.is_empty() {
        return Err(CrsError::configuration(format!(
            "client certificate bundle entry '{}' has no certificate",
            alias
        )));
    }

    tracing::debug!(alias, chain_len = chain.len(), "Loaded client identity");
    Ok(ClientIdentity {
        chain,
        key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(entry.key().to_vec())),
    })
}

/// Load the trusted root certificate. PEM is tried first, then raw DER.
pub fn load_trusted_root(path: &Path) -> Result<CertificateDer<'static>, CrsError> {
    let data = std::fs::read(path).map_err(|e| {
        CrsError::configuration(format!("failed to read server certificate {:?}: {}", path, e))
    })?;
    parse_certificate(&data)
        .map_err(|reason| CrsError::configuration(format!("{:?}: {}", path, reason)))
}

/// Parse a single certificate from PEM or DER bytes.
pub fn parse_certificate(data: &[u8]) -> Result<CertificateDer<'static>, String> {
    if data.starts_with(b"-----BEGIN") {
        let mut reader = data;
        return match rustls_pemfile::certs(&mut reader).next() {
            Some(Ok(cert)) => Ok(cert),
            Some(Err(e)) => Err(format!("invalid PEM certificate: {}", e)),
            None => Err("no certificate found in PEM data".to_string()),
        };
    }
    if data.is_empty() {
        return Err("empty certificate file".to_string());
    }
    Ok(CertificateDer::from(data.to_vec()))
}

/// Uppercase hex SHA-256 of the DER encoding.
pub fn fingerprint(cert: &CertificateDer<'_>) -> String {
    Sha256::digest(cert.as_ref())
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect()
}

fn normalize_fingerprint(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Acceptance rule for the server leaf, applied after chain validation.
#[derive(Clone)]
pub enum LeafPin {
    Any,
    Predicate(Arc<dyn Fn(&CertificateDer<'_>) -> bool + Send + Sync>),
}

impl LeafPin {
    pub fn accepts(&self, leaf: &CertificateDer<'_>) -> bool {
        match self {
            LeafPin::Any => true,
            LeafPin::Predicate(check) => check(leaf),
        }
    }
}

impl fmt::Debug for LeafPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafPin::Any => f.write_str("LeafPin::Any"),
            LeafPin::Predicate(_) => f.write_str("LeafPin::Predicate"),
        }
    }
}

/// Accept only leaves whose SHA-256 fingerprint is listed.
///
/// Matching ignores case, spaces and colons. An empty list accepts any leaf.
pub fn pin_by_fingerprints<I, S>(fingerprints: I) -> LeafPin
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let allowed: HashSet<String> = fingerprints
        .into_iter()
        .map(|f| normalize_fingerprint(f.as_ref()))
        .filter(|f| !f.is_empty())
        .collect();
    if allowed.is_empty() {
        return LeafPin::Any;
    }
    LeafPin::Predicate(Arc::new(move |leaf: &CertificateDer<'_>| allowed.contains(&fingerprint(leaf))))
}

/// Chain validation against a single root, followed by the leaf pin.
#[derive(Debug)]
pub struct PinnedRootVerifier {
    inner: Arc<WebPkiServerVerifier>,
    pin: LeafPin,
}

impl PinnedRootVerifier {
    pub fn new(
        root: CertificateDer<'static>,
        pin: LeafPin,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, CrsError> {
        let mut roots = RootCertStore::empty();
        roots
            .add(root)
            .map_err(|e| CrsError::configuration(format!("invalid trusted root certificate: {}", e)))?;

        let inner = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .map_err(|e| CrsError::configuration(format!("failed to build certificate verifier: {}", e)))?;

        Ok(Self { inner, pin })
    }
}

impl ServerCertVerifier for PinnedRootVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let verified = self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
            .inspect_err(|e| {
                tracing::warn!(target: SECURITY_TARGET, error = %e, "Server certificate chain rejected");
            })?;

        if !self.pin.accepts(end_entity) {
            tracing::warn!(
                target: SECURITY_TARGET,
                fingerprint = %fingerprint(end_entity),
                "Server certificate not in pinned set"
            );
            return Err(rustls::Error::General(
                "server certificate does not match pinned fingerprints".to_string(),
            ));
        }

        Ok(verified)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

pub fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(ring::default_provider())
}

static TLS12_AND_UP: &[&rustls::SupportedProtocolVersion] =
    &[&rustls::version::TLS13, &rustls::version::TLS12];
static TLS13_ONLY: &[&rustls::SupportedProtocolVersion] = &[&rustls::version::TLS13];

fn protocol_versions(min: TlsVersion) -> &'static [&'static rustls::SupportedProtocolVersion] {
    match min {
        TlsVersion::Tls12 => TLS12_AND_UP,
        TlsVersion::Tls13 => TLS13_ONLY,
    }
}

/// Build the mutual-TLS client configuration.
pub fn build_client_tls_config(
    identity: ClientIdentity,
    root: CertificateDer<'static>,
    pin: LeafPin,
    min_version: TlsVersion,
) -> Result<ClientConfig, CrsError> {
    let provider = crypto_provider();
    let verifier = PinnedRootVerifier::new(root, pin, provider.clone())?;

    ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(protocol_versions(min_version))
        .map_err(|e| CrsError::configuration(format!("unsupported TLS versions: {}", e)))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_client_auth_cert(identity.chain, identity.key)
        .map_err(|e| CrsError::configuration(format!("invalid client certificate or key: {}", e)))
}
