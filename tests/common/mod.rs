//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair,
};

use crs_client::error::TransportError;
use crs_client::protocol::envelope::{RequestEnvelope, ResponseEnvelope};
use crs_client::protocol::operations::{
    CommunityPeopleIdsBody, CommunityPeopleIdsResponse, GetPersonBody, GetPersonResponse,
    LoginRequest, LoginResponse, OperationRequest,
};
use crs_client::protocol::{CrsTransport, Fault};
use crs_client::CrsClientOptions;

/// One scripted transport outcome.
pub enum Step<R> {
    Reply(R),
    Fail(TransportError),
    /// Never completes; used to drive per-attempt deadlines.
    Hang,
}

/// Outcomes are consumed in order; once exhausted, `fallback` is replayed.
struct Script<R> {
    steps: VecDeque<Step<R>>,
    fallback: R,
}

impl<R: Clone> Script<R> {
    fn new(fallback: R) -> Self {
        Self {
            steps: VecDeque::new(),
            fallback,
        }
    }

    fn next(&mut self) -> Step<R> {
        self.steps
            .pop_front()
            .unwrap_or_else(|| Step::Reply(self.fallback.clone()))
    }
}

async fn play<R>(step: Step<R>) -> Result<ResponseEnvelope<R>, TransportError> {
    match step {
        Step::Reply(payload) => Ok(ResponseEnvelope::new(payload)),
        Step::Fail(err) => Err(err),
        Step::Hang => std::future::pending().await,
    }
}

/// Scripted in-memory `CrsTransport` that records every call.
pub struct FakeTransport {
    pub login_calls: AtomicU32,
    pub get_person_calls: AtomicU32,
    pub people_ids_calls: AtomicU32,
    login_delay: Mutex<Option<Duration>>,
    login: Mutex<Script<LoginResponse>>,
    person: Mutex<Script<GetPersonResponse>>,
    people_ids: Mutex<Script<CommunityPeopleIdsResponse>>,
    pub person_requests: Mutex<Vec<RequestEnvelope<OperationRequest<GetPersonBody>>>>,
    pub people_ids_requests: Mutex<Vec<RequestEnvelope<OperationRequest<CommunityPeopleIdsBody>>>>,
}

impl FakeTransport {
    /// Logins succeed with token `tok`; reads return empty payloads.
    pub fn new() -> Self {
        Self {
            login_calls: AtomicU32::new(0),
            get_person_calls: AtomicU32::new(0),
            people_ids_calls: AtomicU32::new(0),
            login_delay: Mutex::new(None),
            login: Mutex::new(Script::new(login_ok("tok", None))),
            person: Mutex::new(Script::new(GetPersonResponse::default())),
            people_ids: Mutex::new(Script::new(CommunityPeopleIdsResponse::default())),
            person_requests: Mutex::new(Vec::new()),
            people_ids_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = Some(delay);
    }

    pub fn push_login(&self, step: Step<LoginResponse>) {
        self.login.lock().unwrap().steps.push_back(step);
    }

    pub fn set_login_fallback(&self, response: LoginResponse) {
        self.login.lock().unwrap().fallback = response;
    }

    pub fn push_person(&self, step: Step<GetPersonResponse>) {
        self.person.lock().unwrap().steps.push_back(step);
    }

    pub fn set_person_fallback(&self, response: GetPersonResponse) {
        self.person.lock().unwrap().fallback = response;
    }

    pub fn push_people_ids(&self, step: Step<CommunityPeopleIdsResponse>) {
        self.people_ids.lock().unwrap().steps.push_back(step);
    }

    pub fn logins(&self) -> u32 {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn person_calls(&self) -> u32 {
        self.get_person_calls.load(Ordering::SeqCst)
    }

    pub fn people_calls(&self) -> u32 {
        self.people_ids_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrsTransport for FakeTransport {
    async fn login(
        &self,
        _request: &RequestEnvelope<LoginRequest>,
    ) -> Result<ResponseEnvelope<LoginResponse>, TransportError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.login_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let step = self.login.lock().unwrap().next();
        play(step).await
    }

    async fn get_person(
        &self,
        request: &RequestEnvelope<OperationRequest<GetPersonBody>>,
    ) -> Result<ResponseEnvelope<GetPersonResponse>, TransportError> {
        self.get_person_calls.fetch_add(1, Ordering::SeqCst);
        self.person_requests.lock().unwrap().push(request.clone());
        let step = self.person.lock().unwrap().next();
        play(step).await
    }

    async fn get_community_people_ids(
        &self,
        request: &RequestEnvelope<OperationRequest<CommunityPeopleIdsBody>>,
    ) -> Result<ResponseEnvelope<CommunityPeopleIdsResponse>, TransportError> {
        self.people_ids_calls.fetch_add(1, Ordering::SeqCst);
        self.people_ids_requests.lock().unwrap().push(request.clone());
        let step = self.people_ids.lock().unwrap().next();
        play(step).await
    }
}

pub fn login_ok(token: &str, expires: Option<DateTime<Utc>>) -> LoginResponse {
    LoginResponse {
        token: Some(token.to_string()),
        expires,
        fault: Fault::default(),
    }
}

pub fn login_fault(code: &str, message: &str) -> LoginResponse {
    LoginResponse {
        token: None,
        expires: None,
        fault: Fault::new(code, message),
    }
}

pub fn options() -> CrsClientOptions {
    CrsClientOptions {
        consumer: "EE/GOV/70000001/consumer".into(),
        producer: "EE/GOV/70000002/producer".into(),
        service_subsystem_code: "crs".into(),
        protocol_version: "4.0".into(),
        username: "svc-user".into(),
        password: "svc-pass".into(),
    }
}

// --- Certificate fixtures ---

pub struct Issued {
    pub cert: Certificate,
    pub key: KeyPair,
}

pub fn root_ca(name: &str) -> Issued {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name.push(DnType::CommonName, name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    Issued { cert, key }
}

pub fn server_leaf(host: &str, issuer: &Issued) -> Issued {
    let mut params = CertificateParams::new(vec![host.to_string()]).unwrap();
    params.distinguished_name.push(DnType::CommonName, host);
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    Issued { cert, key }
}

pub fn client_leaf(name: &str, issuer: &Issued) -> Issued {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name.push(DnType::CommonName, name);
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    Issued { cert, key }
}

/// PKCS#12 bundle holding `leaf`'s key and the chain `leaf` → `issuer`.
pub fn pkcs12_bundle(leaf: &Issued, issuer: &Issued, password: &str) -> Vec<u8> {
    let chain = [leaf.cert.der(), issuer.cert.der()]
        .into_iter()
        .map(|der| p12_keystore::Certificate::from_der(der.as_ref()).unwrap());
    let entry = p12_keystore::PrivateKeyChain::new(leaf.key.serialize_der(), b"crs-client-key", chain);

    let mut store = p12_keystore::KeyStore::new();
    store.add_entry("crs-client", p12_keystore::KeyStoreEntry::PrivateKeyChain(entry));
    store.writer(password).write().unwrap()
}
