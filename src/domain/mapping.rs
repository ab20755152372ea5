//! Protocol entity → result record mapping.

use crate::domain::dto::{PersonDto, PersonIdsDto};
use crate::protocol::operations::{NameType, Person, PersonIds, PersonName};

/// `None` in, `None` out.
///
/// First name: the value of the entry tagged `FirstName`, else the first entry's value.
/// Last name: the entry tagged `LastName`; no fallback.
pub fn to_person_dto(person: Option<&Person>) -> Option<PersonDto> {
    let person = person?;
    let names = person.names.as_deref().unwrap_or_default();

    let first_name = tagged(names, NameType::FirstName)
        .and_then(|n| n.value.clone())
        .or_else(|| names.first().and_then(|n| n.value.clone()));
    let last_name = tagged(names, NameType::LastName).and_then(|n| n.value.clone());

    Some(PersonDto {
        id: person.id.value().unwrap_or(0),
        public_id: person.public_id.value(),
        first_name,
        last_name,
        job_title: person.job_title.clone(),
        civil_status: person.civil_status.get().map(ToString::to_string),
        city: person.address.as_ref().and_then(|a| a.city.clone()),
    })
}

pub fn to_person_ids_dto(ids: &PersonIds) -> PersonIdsDto {
    PersonIdsDto {
        id: ids.id.value().unwrap_or(0),
        public_id: ids.public_id.value(),
        external_id: ids.external_id.value(),
    }
}

fn tagged(names: &[PersonName], name_type: NameType) -> Option<&PersonName> {
    names
        .iter()
        .find(|n| n.name_type.get() == Some(&name_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::operations::{CivilStatus, PostalAddress};
    use crate::protocol::Specified;

    #[test]
    fn test_absent_person_maps_to_none() {
        assert_eq!(to_person_dto(None), None);
    }

    #[test]
    fn test_tagged_names_are_selected() {
        let person = Person {
            id: Specified::present(5),
            names: Some(vec![
                PersonName::tagged(NameType::LastName, "Doe"),
                PersonName::tagged(NameType::FirstName, "John"),
            ]),
            ..Default::default()
        };
        let dto = to_person_dto(Some(&person)).unwrap();
        assert_eq!(dto.id, 5);
        assert_eq!(dto.first_name.as_deref(), Some("John"));
        assert_eq!(dto.last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn test_untagged_single_name_falls_back_to_first_name() {
        let person = Person {
            id: Specified::present(7),
            names: Some(vec![PersonName::untagged("OnlyName")]),
            ..Default::default()
        };
        let dto = to_person_dto(Some(&person)).unwrap();
        assert_eq!(dto.first_name.as_deref(), Some("OnlyName"));
        assert_eq!(dto.last_name, None);
    }

    #[test]
    fn test_valueless_first_name_tag_falls_back_to_first_entry() {
        let person = Person {
            names: Some(vec![
                PersonName::untagged("Leading"),
                PersonName {
                    name_type: Specified::present(NameType::FirstName),
                    value: None,
                },
            ]),
            ..Default::default()
        };
        let dto = to_person_dto(Some(&person)).unwrap();
        assert_eq!(dto.first_name.as_deref(), Some("Leading"));
    }

    #[test]
    fn test_last_name_has_no_fallback() {
        let person = Person {
            names: Some(vec![
                PersonName::tagged(NameType::MiddleName, "Middle"),
                PersonName::untagged("Loose"),
            ]),
            ..Default::default()
        };
        let dto = to_person_dto(Some(&person)).unwrap();
        assert_eq!(dto.first_name.as_deref(), Some("Middle"));
        assert_eq!(dto.last_name, None);
        assert_eq!(dto.id, 0);
    }

    #[test]
    fn test_scalars_pass_through() {
        let person = Person {
            id: Specified::present(1),
            public_id: Specified::present(10),
            job_title: Some("Engineer".into()),
            civil_status: Specified::present(CivilStatus::Married),
            address: Some(PostalAddress {
                city: Some("Uppsala".into()),
            }),
            ..Default::default()
        };
        let dto = to_person_dto(Some(&person)).unwrap();
        assert_eq!(dto.public_id, Some(10));
        assert_eq!(dto.job_title.as_deref(), Some("Engineer"));
        assert_eq!(dto.civil_status.as_deref(), Some("Married"));
        assert_eq!(dto.city.as_deref(), Some("Uppsala"));
        assert_eq!(dto.first_name, None);
    }

    #[test]
    fn test_unspecified_civil_status_is_absent() {
        let dto = to_person_dto(Some(&Person::default())).unwrap();
        assert_eq!(dto.civil_status, None);
    }

    #[test]
    fn test_person_ids_keep_presence() {
        let ids = PersonIds {
            id: Specified::present(2),
            public_id: Specified::present(0),
            external_id: Specified::omitted(),
        };
        let dto = to_person_ids_dto(&ids);
        assert_eq!(dto, PersonIdsDto { id: 2, public_id: Some(0), external_id: None });
    }
}
