use serde::{Deserialize, Serialize};

/// Flattened person projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDto {
    pub id: i32,
    pub public_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub civil_status: Option<String>,
    pub city: Option<String>,
}

/// Identifier trio for a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdsDto {
    pub id: i32,
    pub public_id: Option<i32>,
    pub external_id: Option<i32>,
}
