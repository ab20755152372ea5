//! Operation payloads and result entities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::fault::{Fault, FaultCarrier};
use crate::protocol::specified::Specified;

pub const LOGIN: &str = "Login";
pub const GET_PERSON: &str = "GetPerson";
pub const GET_COMMUNITY_PEOPLE_IDS: &str = "GetCommunityPeopleIds";

/// Header attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    pub token: String,
}

/// Authenticated operation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest<B> {
    pub request_header: RequestHeader,
    pub request_body: B,
}

impl<B> OperationRequest<B> {
    pub fn new(token: impl Into<String>, body: B) -> Self {
        Self {
            request_header: RequestHeader { token: token.into() },
            request_body: body,
        }
    }
}

// --- Login ---

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fault: Fault,
}

impl FaultCarrier for LoginResponse {
    fn fault(&self) -> &Fault {
        &self.fault
    }
}

// --- GetPerson ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetPersonBody {
    #[serde(default, skip_serializing_if = "Specified::is_omitted")]
    pub id: Specified<i32>,
    #[serde(default, skip_serializing_if = "Specified::is_omitted")]
    pub include_names: Specified<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GetPersonResponse {
    pub person: Option<Person>,
    #[serde(flatten)]
    pub fault: Fault,
}

impl FaultCarrier for GetPersonResponse {
    fn fault(&self) -> &Fault {
        &self.fault
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameType {
    #[default]
    FirstName,
    MiddleName,
    LastName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonName {
    #[serde(rename = "Type", default, skip_serializing_if = "Specified::is_omitted")]
    pub name_type: Specified<NameType>,
    #[serde(default)]
    pub value: Option<String>,
}

impl PersonName {
    pub fn tagged(name_type: NameType, value: impl Into<String>) -> Self {
        Self {
            name_type: Specified::present(name_type),
            value: Some(value.into()),
        }
    }

    pub fn untagged(value: impl Into<String>) -> Self {
        Self {
            name_type: Specified::omitted(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CivilStatus {
    #[default]
    Unknown,
    Unmarried,
    Married,
    Divorced,
    Widowed,
}

impl fmt::Display for CivilStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CivilStatus::Unknown => "Unknown",
            CivilStatus::Unmarried => "Unmarried",
            CivilStatus::Married => "Married",
            CivilStatus::Divorced => "Divorced",
            CivilStatus::Widowed => "Widowed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PostalAddress {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Person {
    #[serde(skip_serializing_if = "Specified::is_omitted")]
    pub id: Specified<i32>,
    #[serde(skip_serializing_if = "Specified::is_omitted")]
    pub public_id: Specified<i32>,
    pub names: Option<Vec<PersonName>>,
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Specified::is_omitted")]
    pub civil_status: Specified<CivilStatus>,
    pub address: Option<PostalAddress>,
}

// --- GetCommunityPeopleIds ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommunityPeopleIdsBody {
    #[serde(default, skip_serializing_if = "Specified::is_omitted")]
    pub start_index: Specified<i32>,
    #[serde(default, skip_serializing_if = "Specified::is_omitted")]
    pub count: Specified<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PersonIds {
    #[serde(skip_serializing_if = "Specified::is_omitted")]
    pub id: Specified<i32>,
    #[serde(skip_serializing_if = "Specified::is_omitted")]
    pub public_id: Specified<i32>,
    #[serde(skip_serializing_if = "Specified::is_omitted")]
    pub external_id: Specified<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CommunityPeopleIdsResponse {
    pub people_ids: Option<Vec<PersonIds>>,
    #[serde(flatten)]
    pub fault: Fault,
}

impl FaultCarrier for CommunityPeopleIdsResponse {
    fn fault(&self) -> &Fault {
        &self.fault
    }
}
