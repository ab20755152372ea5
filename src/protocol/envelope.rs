//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::CrsClientOptions;

/// Object type tag carried by the identifier sub-objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Subsystem,
    Service,
}

/// Identifies the calling subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentifier {
    pub object_type: ObjectType,
    pub subsystem_code: String,
}

/// Identifies the called service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIdentifier {
    pub object_type: ObjectType,
    pub service_code: String,
}

/// One outbound call. Built once per call and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<P> {
    pub consumer: String,
    pub producer: String,
    pub user_id: String,
    /// Caller-generated correlation id, unique per call.
    pub id: String,
    pub service: String,
    pub protocol_version: String,
    pub client: ClientIdentifier,
    pub service_id: ServiceIdentifier,
    pub payload: P,
}

impl<P> RequestEnvelope<P> {
    /// Build an envelope for `service` with a fresh correlation id.
    pub fn new(options: &CrsClientOptions, service: &str, payload: P) -> Self {
        Self::with_correlation_id(options, service, new_correlation_id(), payload)
    }

    pub fn with_correlation_id(
        options: &CrsClientOptions,
        service: &str,
        correlation_id: String,
        payload: P,
    ) -> Self {
        Self {
            consumer: options.consumer.clone(),
            producer: options.producer.clone(),
            user_id: options.username.clone(),
            id: correlation_id,
            service: service.to_string(),
            protocol_version: options.protocol_version.clone(),
            client: ClientIdentifier {
                object_type: ObjectType::Subsystem,
                subsystem_code: options.service_subsystem_code.clone(),
            },
            service_id: ServiceIdentifier {
                object_type: ObjectType::Service,
                service_code: service.to_string(),
            },
            payload,
        }
    }
}

/// Header fields echoed back by the producer. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvelopeHeader {
    pub consumer: Option<String>,
    pub producer: Option<String>,
    pub user_id: Option<String>,
    pub id: Option<String>,
    pub service: Option<String>,
    pub protocol_version: Option<String>,
}

/// One inbound response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<P> {
    #[serde(default)]
    pub header: EnvelopeHeader,
    pub payload: P,
}

impl<P> ResponseEnvelope<P> {
    pub fn new(payload: P) -> Self {
        Self {
            header: EnvelopeHeader::default(),
            payload,
        }
    }
}

/// Hyphen-less v4 UUID.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
