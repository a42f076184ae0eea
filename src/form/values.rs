//! Current values of an open registration form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{FieldType, FormSchema};

/// Value keys of the four fixed fields that precede the configurable ones.
pub mod standard {
    pub const FULL_NAME: &str = "fullName";
    pub const EMAIL: &str = "email";
    pub const PHONE_NUMBER: &str = "phoneNumber";
    pub const MEMBERSHIP_TYPE: &str = "membershipType";

    pub const KEYS: [&str; 4] = [FULL_NAME, EMAIL, PHONE_NUMBER, MEMBERSHIP_TYPE];
}

/// Separator of the selected choices stored for a checkbox field.
pub const CHECKBOX_SEPARATOR: char = ',';

/// A single user edit. Every edit touches exactly one key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldEdit {
    /// Replace the value of a key.
    Set { key: String, value: String },
    /// Check or uncheck one choice of a checkbox group.
    Toggle {
        key: String,
        choice: String,
        checked: bool,
    },
}

impl FieldEdit {
    pub fn key(&self) -> &str {
        match self {
            FieldEdit::Set { key, .. } | FieldEdit::Toggle { key, .. } => key,
        }
    }
}

/// Mapping from field key to its string value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SubmissionValues(BTreeMap<String, String>);

impl SubmissionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty values for the standard fields and every field of `schema`.
    pub fn cleared(schema: &FormSchema) -> Self {
        let mut values = Self::new();
        for key in standard::KEYS {
            values.set(key, "");
        }
        for field in &schema.fields {
            values.set(&field.label, "");
        }
        values
    }

    /// Value of `key`, or the empty string when unset.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn apply(&mut self, edit: &FieldEdit) {
        match edit {
            FieldEdit::Set { key, value } => self.set(key, value.clone()),
            FieldEdit::Toggle {
                key,
                choice,
                checked,
            } => {
                let updated = toggle_selection(self.get(key), choice, *checked);
                self.set(key, updated);
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubmissionValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Split a stored checkbox value into its selected choices.
pub fn decode_selection(value: &str) -> Vec<&str> {
    if value.is_empty() {
        Vec::new()
    } else {
        value.split(CHECKBOX_SEPARATOR).collect()
    }
}

/// Add or remove `choice` from a stored checkbox value.
pub fn toggle_selection(value: &str, choice: &str, checked: bool) -> String {
    let mut selected = decode_selection(value);
    if checked {
        if !selected.contains(&choice) {
            selected.push(choice);
        }
    } else {
        selected.retain(|c| *c != choice);
    }
    selected.join(&CHECKBOX_SEPARATOR.to_string())
}

/// Reject an edit that does not bind to a rendered control, or that would store a
/// choice outside the field's choice set.
pub fn check_edit(schema: &FormSchema, edit: &FieldEdit) -> Result<(), AppError> {
    let key = edit.key();
    if standard::KEYS.iter().any(|k| *k == key) {
        return match edit {
            FieldEdit::Set { .. } => Ok(()),
            FieldEdit::Toggle { .. } => Err(not_a_checkbox(key)),
        };
    }

    let Some(field) = schema.fields.iter().find(|f| f.label == key) else {
        return Err(AppError::Validation(format!("Medan tidak dikenali: {}", key)));
    };
    let offered = |choice: &str| field.choices().iter().any(|c| c == choice);

    match (edit, field.field_type) {
        (FieldEdit::Toggle { choice, .. }, FieldType::Checkbox) => {
            if offered(choice.as_str()) {
                Ok(())
            } else {
                Err(invalid_choice(key, choice))
            }
        }
        (FieldEdit::Toggle { .. }, _) => Err(not_a_checkbox(key)),
        (FieldEdit::Set { value, .. }, FieldType::Checkbox) => {
            match decode_selection(value).into_iter().find(|c| !offered(*c)) {
                Some(choice) => Err(invalid_choice(key, choice)),
                None => Ok(()),
            }
        }
        (FieldEdit::Set { value, .. }, FieldType::Dropdown | FieldType::Radio) => {
            if value.is_empty() || offered(value.as_str()) {
                Ok(())
            } else {
                Err(invalid_choice(key, value))
            }
        }
        (
            FieldEdit::Set { .. },
            FieldType::Text | FieldType::Email | FieldType::Phone | FieldType::Textarea,
        ) => Ok(()),
    }
}

fn not_a_checkbox(key: &str) -> AppError {
    AppError::Validation(format!("{} bukan kotak semak", key))
}

fn invalid_choice(key: &str, choice: &str) -> AppError {
    AppError::Validation(format!("Pilihan tidak sah untuk {}: {}", key, choice))
}
