//! CRS client facade.
//!
//! # Responsibilities
//! - Keep a valid session token (single-flight login)
//! - Build one envelope per call with a fresh correlation id
//! - Route reads through the resilience executor; never the login
//! - Translate business faults and map entities to result records

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::client::options::CrsClientOptions;
use crate::config::schema::{ResilienceConfig, SessionConfig};
use crate::domain::{to_person_dto, to_person_ids_dto, PersonDto, PersonIdsDto};
use crate::error::{CrsError, CrsResult};
use crate::observability::metrics;
use crate::protocol::envelope::RequestEnvelope;
use crate::protocol::fault::ensure_no_fault;
use crate::protocol::operations::{
    CommunityPeopleIdsBody, GetPersonBody, LoginRequest, OperationRequest, GET_COMMUNITY_PEOPLE_IDS,
    GET_PERSON, LOGIN,
};
use crate::protocol::{CrsTransport, Specified};
use crate::resilience::{CircuitState, ResilienceExecutor};
use crate::session::{LoginGrant, SessionManager};

/// High-level client. Share it behind an `Arc`; all state is internally synchronized.
pub struct CrsClient<T> {
    transport: Arc<T>,
    options: CrsClientOptions,
    sessions: SessionManager,
    executor: ResilienceExecutor,
}

impl<T: CrsTransport> CrsClient<T> {
    pub fn new(transport: Arc<T>, options: CrsClientOptions) -> Self {
        Self::with_policies(
            transport,
            options,
            &SessionConfig::default(),
            ResilienceExecutor::default(),
        )
    }

    pub fn with_policies(
        transport: Arc<T>,
        options: CrsClientOptions,
        session: &SessionConfig,
        executor: ResilienceExecutor,
    ) -> Self {
        Self {
            transport,
            options,
            sessions: SessionManager::new(session),
            executor,
        }
    }

    pub fn from_config(
        transport: Arc<T>,
        options: CrsClientOptions,
        session: &SessionConfig,
        resilience: &ResilienceConfig,
    ) -> Self {
        Self::with_policies(
            transport,
            options,
            session,
            ResilienceExecutor::from_config("crs", resilience),
        )
    }

    pub fn options(&self) -> &CrsClientOptions {
        &self.options
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.executor.circuit_state()
    }

    /// Forget the cached token; the next call logs in again.
    pub fn invalidate_session(&self) {
        self.sessions.invalidate();
    }

    /// Return a valid token, logging in if it is absent or about to expire.
    pub async fn ensure_token(&self, cancel: &CancellationToken) -> CrsResult<String> {
        self.sessions.ensure_token(cancel, || self.login()).await
    }

    async fn login(&self) -> CrsResult<LoginGrant> {
        let request = RequestEnvelope::new(
            &self.options,
            LOGIN,
            LoginRequest {
                username: self.options.username.clone(),
                password: self.options.password.clone(),
            },
        );
        tracing::debug!(correlation_id = %request.id, "Invoking login");

        let response = self.transport.login(&request).await?;
        let payload = ensure_no_fault(LOGIN, response.payload)?;
        Ok(LoginGrant {
            token: payload.token,
            expires: payload.expires,
        })
    }

    /// Fetch a person by internal id. `Ok(None)` when the producer returns no entity.
    pub async fn get_person(&self, id: i32, cancel: &CancellationToken) -> CrsResult<Option<PersonDto>> {
        let start = Instant::now();
        let result = self.get_person_inner(id, cancel).await;
        record_outcome(GET_PERSON, &result, start);
        result
    }

    async fn get_person_inner(&self, id: i32, cancel: &CancellationToken) -> CrsResult<Option<PersonDto>> {
        let token = self.ensure_token(cancel).await?;
        let request = RequestEnvelope::new(
            &self.options,
            GET_PERSON,
            OperationRequest::new(
                token,
                GetPersonBody {
                    id: Specified::present(id),
                    include_names: Specified::present(true),
                },
            ),
        );
        tracing::debug!(correlation_id = %request.id, person_id = id, "Invoking GetPerson");

        let transport = &self.transport;
        let request = &request;
        let response = self
            .executor
            .execute(GET_PERSON, cancel, || async move {
                transport.get_person(request).await.map_err(CrsError::from)
            })
            .await?;

        let payload = ensure_no_fault(GET_PERSON, response.payload)?;
        Ok(to_person_dto(payload.person.as_ref()))
    }

    /// Fetch one page of community people ids, in producer order.
    ///
    /// `count = None` omits the field on the wire; `Some(0)` sends an explicit zero.
    pub async fn get_community_people_ids(
        &self,
        start_index: i32,
        count: Option<i32>,
        cancel: &CancellationToken,
    ) -> CrsResult<Vec<PersonIdsDto>> {
        let start = Instant::now();
        let result = self
            .get_community_people_ids_inner(start_index, count, cancel)
            .await;
        record_outcome(GET_COMMUNITY_PEOPLE_IDS, &result, start);
        result
    }

    async fn get_community_people_ids_inner(
        &self,
        start_index: i32,
        count: Option<i32>,
        cancel: &CancellationToken,
    ) -> CrsResult<Vec<PersonIdsDto>> {
        let token = self.ensure_token(cancel).await?;
        let request = RequestEnvelope::new(
            &self.options,
            GET_COMMUNITY_PEOPLE_IDS,
            OperationRequest::new(
                token,
                CommunityPeopleIdsBody {
                    start_index: Specified::present(start_index),
                    count: Specified::from(count),
                },
            ),
        );
        tracing::debug!(
            correlation_id = %request.id,
            start_index,
            count = ?count,
            "Invoking GetCommunityPeopleIds"
        );

        let transport = &self.transport;
        let request = &request;
        let response = self
            .executor
            .execute(GET_COMMUNITY_PEOPLE_IDS, cancel, || async move {
                transport
                    .get_community_people_ids(request)
                    .await
                    .map_err(CrsError::from)
            })
            .await?;

        let payload = ensure_no_fault(GET_COMMUNITY_PEOPLE_IDS, response.payload)?;
        Ok(payload
            .people_ids
            .unwrap_or_default()
            .iter()
            .map(to_person_ids_dto)
            .collect())
    }
}

impl<T> std::fmt::Debug for CrsClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrsClient")
            .field("options", &self.options)
            .field("circuit_state", &self.executor.circuit_state())
            .finish()
    }
}

fn record_outcome<R>(operation: &str, result: &CrsResult<R>, start: Instant) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.label(),
    };
    metrics::record_call(operation, outcome, start);
}
