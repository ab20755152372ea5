//! Remote operation invocation seam.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::protocol::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::protocol::operations::{
    CommunityPeopleIdsBody, CommunityPeopleIdsResponse, GetPersonBody, GetPersonResponse,
    LoginRequest, LoginResponse, OperationRequest,
};

/// One method per remote operation.
///
/// Implementations tag every failure with a `FailureKind` exactly once; the
/// client never inspects error types further. A response carrying a fault
/// code is still `Ok` at this layer.
#[async_trait]
pub trait CrsTransport: Send + Sync {
    async fn login(
        &self,
        request: &RequestEnvelope<LoginRequest>,
    ) -> Result<ResponseEnvelope<LoginResponse>, TransportError>;

    async fn get_person(
        &self,
        request: &RequestEnvelope<OperationRequest<GetPersonBody>>,
    ) -> Result<ResponseEnvelope<GetPersonResponse>, TransportError>;

    async fn get_community_people_ids(
        &self,
        request: &RequestEnvelope<OperationRequest<CommunityPeopleIdsBody>>,
    ) -> Result<ResponseEnvelope<CommunityPeopleIdsResponse>, TransportError>;
}
