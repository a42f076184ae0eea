//! Renders a form schema into input controls bound to value keys.

use serde::Serialize;

use super::validate::FieldErrors;
use super::values::{decode_selection, standard, SubmissionValues};
use crate::models::{FieldDescriptor, FieldType, FormSchema, MembershipType};

/// Input kind hint for single-line inputs.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Email,
    Tel,
}

/// One selectable choice of a select, radio or checkbox control.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChoiceOption {
    pub id: String,
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Widget used to edit a value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum Widget {
    #[serde(rename_all = "camelCase")]
    Input {
        input_kind: InputKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    TextArea { rows: u8 },
    Select {
        placeholder: String,
        options: Vec<ChoiceOption>,
    },
    RadioGroup { options: Vec<ChoiceOption> },
    CheckboxGroup { options: Vec<ChoiceOption> },
}

/// A rendered control bound to exactly one key of the submission values.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub key: String,
    pub label: String,
    pub required: bool,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub disabled: bool,
    #[serde(flatten)]
    pub widget: Widget,
}

const TEXTAREA_ROWS: u8 = 4;

/// DOM-style id for a field label: whitespace runs become `-`, lowercased.
pub fn field_id(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Render the standard fields followed by every schema field, in schema order.
pub fn render_form(
    schema: &FormSchema,
    values: &SubmissionValues,
    errors: &FieldErrors,
) -> Vec<Control> {
    let mut controls = standard_controls(values);
    controls.extend(schema.fields.iter().map(|f| field_control(f, values)));

    for control in &mut controls {
        control.error = errors.get(&control.key).cloned();
    }
    controls
}

/// Disabled, empty rendering of a draft schema for the form builder.
pub fn render_preview(schema: &FormSchema) -> Vec<Control> {
    let mut controls = render_form(schema, &SubmissionValues::new(), &FieldErrors::new());
    for control in &mut controls {
        control.disabled = true;
    }
    controls
}

fn standard_controls(values: &SubmissionValues) -> Vec<Control> {
    let membership = values.get(standard::MEMBERSHIP_TYPE);
    let membership_options = MembershipType::ALL
        .iter()
        .map(|t| ChoiceOption {
            id: format!("{}-{}", standard::MEMBERSHIP_TYPE, t.code()),
            value: t.code().to_string(),
            label: t.label().to_string(),
            selected: membership == t.code(),
        })
        .collect();

    vec![
        standard_input(
            standard::FULL_NAME,
            "Nama Penuh",
            InputKind::Text,
            "Contoh: Ahmad bin Abdullah",
            values,
        ),
        standard_input(
            standard::EMAIL,
            "E-mel",
            InputKind::Email,
            "contoh@email.com",
            values,
        ),
        standard_input(
            standard::PHONE_NUMBER,
            "Nombor Telefon",
            InputKind::Tel,
            "012-3456789",
            values,
        ),
        Control {
            id: standard::MEMBERSHIP_TYPE.to_string(),
            key: standard::MEMBERSHIP_TYPE.to_string(),
            label: "Jenis Keahlian".to_string(),
            required: true,
            value: membership.to_string(),
            error: None,
            disabled: false,
            widget: Widget::Select {
                placeholder: "Pilih jenis keahlian".to_string(),
                options: membership_options,
            },
        },
    ]
}

fn standard_input(
    key: &str,
    label: &str,
    input_kind: InputKind,
    placeholder: &str,
    values: &SubmissionValues,
) -> Control {
    Control {
        id: key.to_string(),
        key: key.to_string(),
        label: label.to_string(),
        required: true,
        value: values.get(key).to_string(),
        error: None,
        disabled: false,
        widget: Widget::Input {
            input_kind,
            placeholder: Some(placeholder.to_string()),
        },
    }
}

fn field_control(field: &FieldDescriptor, values: &SubmissionValues) -> Control {
    let id = field_id(&field.label);
    let value = values.get(&field.label);

    let widget = match field.field_type {
        FieldType::Text => text_input(InputKind::Text),
        FieldType::Email => text_input(InputKind::Email),
        FieldType::Phone => text_input(InputKind::Tel),
        FieldType::Textarea => Widget::TextArea {
            rows: TEXTAREA_ROWS,
        },
        FieldType::Dropdown => Widget::Select {
            placeholder: format!("Pilih {}", field.label.to_lowercase()),
            options: choice_options(&id, field, |choice| choice == value),
        },
        FieldType::Radio => Widget::RadioGroup {
            options: choice_options(&id, field, |choice| choice == value),
        },
        FieldType::Checkbox => {
            let selected = decode_selection(value);
            Widget::CheckboxGroup {
                options: choice_options(&id, field, |choice| {
                    selected.iter().any(|s| *s == choice)
                }),
            }
        }
    };

    Control {
        id,
        key: field.label.clone(),
        label: field.label.clone(),
        required: field.required,
        value: value.to_string(),
        error: None,
        disabled: false,
        widget,
    }
}

fn text_input(input_kind: InputKind) -> Widget {
    Widget::Input {
        input_kind,
        placeholder: None,
    }
}

fn choice_options<F>(id: &str, field: &FieldDescriptor, is_selected: F) -> Vec<ChoiceOption>
where
    F: Fn(&str) -> bool,
{
    field
        .choices()
        .iter()
        .map(|choice| ChoiceOption {
            id: format!("{}-{}", id, choice),
            value: choice.clone(),
            label: choice.clone(),
            selected: is_selected(choice),
        })
        .collect()
}
