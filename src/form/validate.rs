//! Client-side validation of a registration submission.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::values::{standard, SubmissionValues};
use crate::models::{FieldType, FormSchema};

/// Field key to inline error message. Empty means the submission is valid.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s()]{8,}$").expect("phone pattern compiles"));

const INVALID_EMAIL: &str = "Format e-mel tidak sah";
const INVALID_PHONE: &str = "Format nombor telefon tidak sah";

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Validate the standard fields and every field of `schema` against `values`.
pub fn validate(schema: &FormSchema, values: &SubmissionValues) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if values.get(standard::FULL_NAME).trim().is_empty() {
        errors.insert(standard::FULL_NAME.into(), "Nama penuh diperlukan".into());
    }

    let email = values.get(standard::EMAIL);
    if email.trim().is_empty() {
        errors.insert(standard::EMAIL.into(), "E-mel diperlukan".into());
    } else if !is_valid_email(email) {
        errors.insert(standard::EMAIL.into(), INVALID_EMAIL.into());
    }

    let phone = values.get(standard::PHONE_NUMBER);
    if phone.trim().is_empty() {
        errors.insert(
            standard::PHONE_NUMBER.into(),
            "Nombor telefon diperlukan".into(),
        );
    } else if !is_valid_phone(phone) {
        errors.insert(standard::PHONE_NUMBER.into(), INVALID_PHONE.into());
    }

    if values.get(standard::MEMBERSHIP_TYPE).trim().is_empty() {
        errors.insert(
            standard::MEMBERSHIP_TYPE.into(),
            "Jenis keahlian diperlukan".into(),
        );
    }

    for field in &schema.fields {
        let value = values.get(&field.label);

        if field.required && value.trim().is_empty() {
            errors.insert(field.label.clone(), format!("{} diperlukan", field.label));
        }

        // Format checks run on any non-empty value and take precedence.
        if value.is_empty() {
            continue;
        }
        match field.field_type {
            FieldType::Email if !is_valid_email(value) => {
                errors.insert(field.label.clone(), INVALID_EMAIL.into());
            }
            FieldType::Phone if !is_valid_phone(value) => {
                errors.insert(field.label.clone(), INVALID_PHONE.into());
            }
            FieldType::Text
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Textarea
            | FieldType::Dropdown
            | FieldType::Radio
            | FieldType::Checkbox => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldDescriptor;

    fn valid_standard() -> SubmissionValues {
        [
            (standard::FULL_NAME, "Ahmad bin Abdullah"),
            (standard::EMAIL, "a@b.com"),
            (standard::PHONE_NUMBER, "012-3456789"),
            (standard::MEMBERSHIP_TYPE, "biasa"),
        ]
        .into_iter()
        .collect()
    }

    fn field(label: &str, field_type: FieldType, required: bool) -> FieldDescriptor {
        let choices = if field_type.is_choice_based() {
            vec!["A".to_string(), "B".to_string()]
        } else {
            vec![]
        };
        FieldDescriptor::new(label, field_type, required, choices).unwrap()
    }

    #[test]
    fn test_required_dynamic_field_reports_label() {
        let schema = FormSchema::new(vec![field("Alamat", FieldType::Text, true)]);
        let mut values = valid_standard();
        values.set("Alamat", "");

        let errors = validate(&schema, &values);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["Alamat"], "Alamat diperlukan");
    }

    #[test]
    fn test_valid_standard_fields_pass() {
        let errors = validate(&FormSchema::default(), &valid_standard());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_form_reports_every_standard_field() {
        let errors = validate(&FormSchema::default(), &SubmissionValues::new());
        assert_eq!(errors["fullName"], "Nama penuh diperlukan");
        assert_eq!(errors["email"], "E-mel diperlukan");
        assert_eq!(errors["phoneNumber"], "Nombor telefon diperlukan");
        assert_eq!(errors["membershipType"], "Jenis keahlian diperlukan");
    }

    #[test]
    fn test_malformed_standard_fields() {
        let mut values = valid_standard();
        values.set(standard::EMAIL, "ahmad@mail");
        values.set(standard::PHONE_NUMBER, "0123");

        let errors = validate(&FormSchema::default(), &values);
        assert_eq!(errors["email"], INVALID_EMAIL);
        assert_eq!(errors["phoneNumber"], INVALID_PHONE);
    }

    #[test]
    fn test_phone_pattern_accepts_punctuation() {
        assert!(is_valid_phone("+60 (12) 345-6789"));
        assert!(is_valid_phone("01234567"));
        assert!(!is_valid_phone("0123456"));
        assert!(!is_valid_phone("012-345x789"));
    }

    #[test]
    fn test_dynamic_format_checks() {
        let schema = FormSchema::new(vec![
            field("E-mel Kecemasan", FieldType::Email, false),
            field("Telefon Pejabat", FieldType::Phone, false),
        ]);
        let mut values = valid_standard();
        values.set("E-mel Kecemasan", "bukan-emel");
        values.set("Telefon Pejabat", "abc");

        let errors = validate(&schema, &values);
        assert_eq!(errors["E-mel Kecemasan"], INVALID_EMAIL);
        assert_eq!(errors["Telefon Pejabat"], INVALID_PHONE);

        // Optional format fields left empty are fine.
        let errors = validate(&schema, &valid_standard());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_format_error_overrides_required_error() {
        let schema = FormSchema::new(vec![field("E-mel Kedua", FieldType::Email, true)]);
        let mut values = valid_standard();
        values.set("E-mel Kedua", "   ");

        let errors = validate(&schema, &values);
        assert_eq!(errors["E-mel Kedua"], INVALID_EMAIL);
    }

    #[test]
    fn test_non_choice_schema_only_reports_required_errors() {
        let schema = FormSchema::new(vec![
            field("Alamat", FieldType::Textarea, true),
            field("Pekerjaan", FieldType::Text, true),
            field("Catatan", FieldType::Text, false),
        ]);
        let errors = validate(&schema, &valid_standard());
        assert_eq!(errors.len(), 2);
        for (label, message) in &errors {
            assert_eq!(message, &format!("{} diperlukan", label));
        }
    }

    #[test]
    fn test_choice_fields_only_need_a_value_when_required() {
        let schema = FormSchema::new(vec![
            field("Negeri", FieldType::Dropdown, true),
            field("Jantina", FieldType::Radio, false),
            field("Minat", FieldType::Checkbox, true),
        ]);
        let mut values = valid_standard();
        values.set("Negeri", "A");
        values.set("Minat", "A,B");
        assert!(validate(&schema, &values).is_empty());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = FormSchema::new(vec![
            field("Alamat", FieldType::Text, true),
            field("E-mel Kedua", FieldType::Email, false),
        ]);
        let mut values = valid_standard();
        values.set(standard::PHONE_NUMBER, "12");
        values.set("E-mel Kedua", "x@");

        let first = validate(&schema, &values);
        let second = validate(&schema, &values);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
