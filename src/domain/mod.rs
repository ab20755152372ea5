//! Plain result records and the mapping from protocol entities.
//!
//! Only `mapping.rs` touches protocol entity types, so protocol changes stay
//! contained there.

pub mod dto;
pub mod mapping;

pub use dto::{PersonDto, PersonIdsDto};
pub use mapping::{to_person_dto, to_person_ids_dto};
