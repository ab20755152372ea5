use serde::{Deserialize, Serialize};

/// Caller identity embedded in every envelope, plus login credentials.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrsClientOptions {
    /// Consumer member id.
    pub consumer: String,
    /// Producer member id.
    pub producer: String,
    /// Subsystem code used in the client identifier.
    pub service_subsystem_code: String,
    pub protocol_version: String,
    /// Login username; also sent as the envelope user id.
    pub username: String,
    pub password: String,
}

impl Default for CrsClientOptions {
    fn default() -> Self {
        Self {
            consumer: String::new(),
            producer: String::new(),
            service_subsystem_code: String::new(),
            protocol_version: "4.0".to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for CrsClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrsClientOptions")
            .field("consumer", &self.consumer)
            .field("producer", &self.producer)
            .field("service_subsystem_code", &self.service_subsystem_code)
            .field("protocol_version", &self.protocol_version)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
