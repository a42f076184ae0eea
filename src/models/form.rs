//! Registration form schema matching the backend `RegistrationForm` interface.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Input type of a configurable form field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Textarea,
    Dropdown,
    Radio,
    Checkbox,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Textarea,
        FieldType::Dropdown,
        FieldType::Radio,
        FieldType::Checkbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Textarea => "textarea",
            FieldType::Dropdown => "dropdown",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Whether fields of this type select from a fixed choice set.
    pub fn is_choice_based(&self) -> bool {
        matches!(
            self,
            FieldType::Dropdown | FieldType::Radio | FieldType::Checkbox
        )
    }
}

/// One configurable entry of the registration form.
///
/// `choices` is `Some` exactly when the type is choice-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    #[serde(rename = "fieldLabel")]
    pub label: String,
    #[serde(rename = "fieldType")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(rename = "options", default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl FieldDescriptor {
    /// Build a descriptor, returning `None` when the label is blank or a
    /// choice-based type has no choices. Choices given to other types are dropped.
    pub fn new(
        label: &str,
        field_type: FieldType,
        required: bool,
        choices: Vec<String>,
    ) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let choices = if field_type.is_choice_based() {
            if choices.is_empty() {
                return None;
            }
            Some(choices)
        } else {
            None
        };

        Some(Self {
            label: label.to_string(),
            field_type,
            required,
            choices,
        })
    }

    /// The field's choices, empty for free-text types.
    pub fn choices(&self) -> &[String] {
        self.choices.as_deref().unwrap_or(&[])
    }
}

/// Ordered list of configurable fields; order drives render and column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormSchema {
    pub fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.fields.iter().any(|f| f.label == label)
    }

    /// Check label uniqueness and the choices/type invariant.
    pub fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.label.trim().is_empty() {
                return Err("Field label is required".to_string());
            }
            if !seen.insert(field.label.as_str()) {
                return Err(format!("Duplicate field label '{}'", field.label));
            }
            match (field.field_type.is_choice_based(), &field.choices) {
                (true, Some(choices)) if !choices.is_empty() => {}
                (true, _) => {
                    return Err(format!("Field '{}' requires options", field.label));
                }
                (false, Some(_)) => {
                    return Err(format!(
                        "Field '{}' of type {} cannot have options",
                        field.label,
                        field.field_type.as_str()
                    ));
                }
                (false, None) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_round_trips_through_str() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::parse(t.as_str()), Some(t));
        }
        assert_eq!(FieldType::parse("date"), None);
    }

    #[test]
    fn test_descriptor_enforces_choice_invariant() {
        assert!(FieldDescriptor::new("Negeri", FieldType::Dropdown, true, vec![]).is_none());
        assert!(FieldDescriptor::new("  ", FieldType::Text, true, vec![]).is_none());

        let text =
            FieldDescriptor::new("Alamat", FieldType::Text, true, vec!["stray".into()]).unwrap();
        assert_eq!(text.choices, None);

        let radio =
            FieldDescriptor::new(" Jantina ", FieldType::Radio, false, vec!["L".into(), "P".into()])
                .unwrap();
        assert_eq!(radio.label, "Jantina");
        assert_eq!(radio.choices(), ["L", "P"]);
    }

    #[test]
    fn test_wire_format_uses_backend_names() {
        let json = serde_json::json!({
            "fields": [
                { "fieldLabel": "Alamat", "fieldType": "textarea", "required": true },
                { "fieldLabel": "Negeri", "fieldType": "dropdown", "required": false,
                  "options": ["Johor", "Kedah"] }
            ]
        });
        let schema: FormSchema = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields[1].field_type, FieldType::Dropdown);
        assert!(schema.check().is_ok());
        assert_eq!(serde_json::to_value(&schema).unwrap(), json);
    }

    #[test]
    fn test_check_rejects_duplicates_and_stray_options() {
        let dup = FormSchema::new(vec![
            FieldDescriptor::new("Alamat", FieldType::Text, false, vec![]).unwrap(),
            FieldDescriptor::new("Alamat", FieldType::Textarea, false, vec![]).unwrap(),
        ]);
        assert!(dup.check().unwrap_err().contains("Duplicate"));

        let stray = FormSchema::new(vec![FieldDescriptor {
            label: "Umur".into(),
            field_type: FieldType::Text,
            required: false,
            choices: Some(vec!["1".into()]),
        }]);
        assert!(stray.check().is_err());
    }
}
