//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::{CrsConfig, MtlsConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::error::CrsError;

pub const ENV_ENDPOINT_URL: &str = "CRS_ENDPOINT_URL";
pub const ENV_ALLOW_HTTP: &str = "CRS_ALLOW_HTTP";
pub const ENV_CLIENT_CERT_PFX: &str = "CRS_CLIENT_CERT_PFX";
pub const ENV_CLIENT_CERT_PWD: &str = "CRS_CLIENT_CERT_PWD";
pub const ENV_USERNAME: &str = "CRS_USERNAME";
pub const ENV_PASSWORD: &str = "CRS_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CrsError {
    fn from(err: ConfigError) -> Self {
        CrsError::Configuration(err.to_string())
    }
}

/// Load, apply environment overrides, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<CrsConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse TOML text, resolving overrides through `env`.
pub fn parse_config<E>(content: &str, env: E) -> Result<CrsConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config: CrsConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, env);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Environment variables take precedence over file values.
pub fn apply_env_overrides<E>(config: &mut CrsConfig, env: E)
where
    E: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_ENDPOINT_URL) {
        tracing::info!(base_url = %url, "Endpoint overridden from environment");
        config.transport.base_url = url;
    }
    if let Some(flag) = non_empty(ENV_ALLOW_HTTP) {
        config.transport.allow_insecure_http = flag.eq_ignore_ascii_case("true");
    }
    if let Some(user) = non_empty(ENV_USERNAME) {
        config.client.username = user;
    }
    if let Some(password) = non_empty(ENV_PASSWORD) {
        config.client.password = password;
    }
    if let Some(pfx) = non_empty(ENV_CLIENT_CERT_PFX) {
        let mtls = config.transport.mtls.get_or_insert_with(MtlsConfig::default);
        mtls.client_pfx_path = pfx;
        if let Some(pwd) = env(ENV_CLIENT_CERT_PWD) {
            mtls.client_pfx_password = pwd;
        }
    }
}
