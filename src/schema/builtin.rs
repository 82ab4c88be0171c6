//! Built-in record types for the elder care service.

use serde_json::json;

use super::types::{FieldDef, FieldKind, RecordType};

/// Service kinds a care request may ask for.
pub const SERVICE_KINDS: [&str; 7] = [
    "house_cleaning",
    "meal_preparation",
    "toileting_support",
    "companionship",
    "medication_reminders",
    "shopping_errands",
    "overnight",
];

pub const CARE_REQUEST: &str = "CareRequest";
pub const CAREGIVER: &str = "Caregiver";

/// Care requests submitted by families and clients.
pub fn care_request() -> RecordType {
    RecordType::new(
        CARE_REQUEST,
        vec![
            FieldDef::required_string("full_name").describe("Requestor's full name"),
            FieldDef::optional("email", FieldKind::Email).describe("Contact email"),
            FieldDef::required_string("phone").describe("Contact phone number"),
            FieldDef::required_string("address").describe("Service address"),
            FieldDef::optional("preferred_dates", FieldKind::DateList)
                .describe("Preferred service dates"),
            FieldDef::optional_string("preferred_time_window")
                .describe("e.g. 'mornings', 'evenings', 'overnight'"),
            // An empty list is accepted.
            FieldDef::required("services", FieldKind::enum_list_of(&SERVICE_KINDS))
                .describe("Selected services"),
            FieldDef::optional_string("notes").describe("Additional details or special needs"),
        ],
    )
    .with_description("Care requests submitted by families/clients")
}

/// Caregiver profiles.
pub fn caregiver() -> RecordType {
    RecordType::new(
        CAREGIVER,
        vec![
            FieldDef::required_string("name").describe("Caregiver full name"),
            FieldDef::required_int_range("years_experience", 0, 60),
            FieldDef::defaulted("specialties", FieldKind::StringList, json!([])),
            FieldDef::defaulted("can_overnight", FieldKind::Bool, json!(false)),
            FieldDef::defaulted("availability", FieldKind::StringList, json!([]))
                .describe("e.g. ['mornings', 'evenings', 'weekends']"),
            FieldDef::optional_string("bio"),
            FieldDef::optional_float_range("rating", 0.0, 5.0),
        ],
    )
    .with_description("Caregiver profiles")
}

pub fn builtin_types() -> Vec<RecordType> {
    vec![care_request(), caregiver()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types_are_well_formed() {
        for record_type in builtin_types() {
            assert!(record_type.validate_structure().is_ok(), "{}", record_type.name);
        }
    }

    #[test]
    fn test_care_request_field_order() {
        let names: Vec<_> = care_request().fields.iter().map(|f| f.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "full_name",
                "email",
                "phone",
                "address",
                "preferred_dates",
                "preferred_time_window",
                "services",
                "notes"
            ]
        );
    }

    #[test]
    fn test_service_enumeration_has_seven_kinds() {
        match &care_request().field("services").unwrap().kind {
            FieldKind::EnumList { values } => assert_eq!(values.len(), 7),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
