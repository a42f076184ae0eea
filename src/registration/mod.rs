//! Submission pipeline of the member registration form.
//!
//! `Idle -> Validating -> Submitting -> Succeeded | Failed`. Validation failures return to
//! `Idle` with the errors recorded; the remote call happens between [`RegistrationScreen::begin_submit`]
//! and [`RegistrationScreen::finish_submit`] so no lock is held while it is awaited.

use serde::Serialize;

use crate::errors::AppError;
use crate::form::{
    check_edit, render_form, standard, validate, Control, FieldEdit, FieldErrors, SubmissionValues,
};
use crate::models::{FormSchema, RegisterMemberRequest};

const RETRY_HINT: &str = "Sila cuba lagi";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Validating,
    Submitting,
    #[serde(rename_all = "camelCase")]
    Succeeded { member_id: u64 },
    Failed { message: String },
}

/// Local state of one open registration form.
#[derive(Debug, Clone)]
pub struct RegistrationScreen {
    schema: FormSchema,
    values: SubmissionValues,
    errors: FieldErrors,
    phase: Phase,
}

impl RegistrationScreen {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            values: SubmissionValues::cleared(&schema),
            schema,
            errors: FieldErrors::new(),
            phase: Phase::Idle,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &SubmissionValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Failed { .. })
    }

    /// Adopt a newer schema from the backend while the form is idle.
    pub fn refresh_schema(&mut self, schema: FormSchema) {
        if self.phase != Phase::Idle || schema == self.schema {
            return;
        }
        for field in &schema.fields {
            if !self.schema.contains_label(&field.label) {
                self.values.set(&field.label, "");
            }
        }
        self.schema = schema;
    }

    /// Apply a batch of edits. Nothing is applied unless every edit binds to a control.
    pub fn edit(&mut self, edits: &[FieldEdit]) -> Result<(), AppError> {
        if let Phase::Succeeded { .. } = self.phase {
            return Err(AppError::Conflict(
                "Pendaftaran telah selesai".to_string(),
            ));
        }
        for edit in edits {
            check_edit(&self.schema, edit)?;
        }
        for edit in edits {
            self.values.apply(edit);
        }
        Ok(())
    }

    /// Validate and, when valid, move to `Submitting` and return the call to make.
    /// Returns `Ok(None)` when validation failed and the form is back to `Idle`.
    pub fn begin_submit(&mut self) -> Result<Option<RegisterMemberRequest>, AppError> {
        match self.phase {
            Phase::Submitting | Phase::Validating => {
                return Err(AppError::Conflict(
                    "Pendaftaran sedang diproses".to_string(),
                ))
            }
            Phase::Succeeded { .. } => {
                return Err(AppError::Conflict(
                    "Pendaftaran telah selesai".to_string(),
                ))
            }
            Phase::Idle | Phase::Failed { .. } => {}
        }

        self.phase = Phase::Validating;
        self.errors = validate(&self.schema, &self.values);
        if !self.errors.is_empty() {
            self.phase = Phase::Idle;
            return Ok(None);
        }

        self.phase = Phase::Submitting;
        Ok(Some(build_request(&self.schema, &self.values)))
    }

    /// Record the outcome of the `registerMember` call.
    pub fn finish_submit(&mut self, result: Result<u64, AppError>) {
        match result {
            Ok(member_id) => {
                self.phase = Phase::Succeeded { member_id };
                self.values = SubmissionValues::cleared(&self.schema);
                self.errors.clear();
            }
            Err(e) => {
                let message = e.message();
                self.phase = Phase::Failed {
                    message: if message.trim().is_empty() {
                        RETRY_HINT.to_string()
                    } else {
                        message
                    },
                };
            }
        }
    }

    /// Dismiss the remote error message; values stay as entered.
    pub fn dismiss_error(&mut self) {
        if let Phase::Failed { .. } = self.phase {
            self.phase = Phase::Idle;
        }
    }

    /// Leave the confirmation and start an empty form.
    pub fn register_another(&mut self) {
        if let Phase::Succeeded { .. } = self.phase {
            self.phase = Phase::Idle;
            self.values = SubmissionValues::cleared(&self.schema);
            self.errors.clear();
        }
    }

    /// Controls to draw; the confirmation state shows none.
    pub fn controls(&self) -> Vec<Control> {
        match self.phase {
            Phase::Succeeded { .. } => Vec::new(),
            _ => render_form(&self.schema, &self.values, &self.errors),
        }
    }
}

/// Package the standard fields and the non-empty schema fields, in schema order.
pub fn build_request(schema: &FormSchema, values: &SubmissionValues) -> RegisterMemberRequest {
    let custom_fields = schema
        .fields
        .iter()
        .filter_map(|field| {
            let value = values.get(&field.label);
            (!value.is_empty()).then(|| (field.label.clone(), value.to_string()))
        })
        .collect();

    RegisterMemberRequest {
        full_name: values.get(standard::FULL_NAME).to_string(),
        email: values.get(standard::EMAIL).to_string(),
        phone_number: values.get(standard::PHONE_NUMBER).to_string(),
        membership_type: values.get(standard::MEMBERSHIP_TYPE).to_string(),
        custom_fields,
    }
}

/// Member id as shown on the confirmation and in the roster.
pub fn display_member_id(id: u64) -> String {
    format!("#{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDescriptor, FieldType};

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldDescriptor::new("Alamat", FieldType::Text, true, vec![]).unwrap(),
            FieldDescriptor::new("Catatan", FieldType::Textarea, false, vec![]).unwrap(),
            FieldDescriptor::new(
                "Minat",
                FieldType::Checkbox,
                false,
                vec!["Bola".into(), "Catur".into()],
            )
            .unwrap(),
        ])
    }

    fn set(screen: &mut RegistrationScreen, key: &str, value: &str) {
        screen
            .edit(&[FieldEdit::Set {
                key: key.into(),
                value: value.into(),
            }])
            .unwrap();
    }

    fn filled_screen() -> RegistrationScreen {
        let mut screen = RegistrationScreen::new(schema());
        set(&mut screen, standard::FULL_NAME, "Ahmad bin Abdullah");
        set(&mut screen, standard::EMAIL, "a@b.com");
        set(&mut screen, standard::PHONE_NUMBER, "012-3456789");
        set(&mut screen, standard::MEMBERSHIP_TYPE, "biasa");
        set(&mut screen, "Alamat", "Ipoh");
        screen
            .edit(&[FieldEdit::Toggle {
                key: "Minat".into(),
                choice: "Catur".into(),
                checked: true,
            }])
            .unwrap();
        screen
    }

    #[test]
    fn test_invalid_submission_returns_to_idle_with_errors() {
        let mut screen = RegistrationScreen::new(schema());
        assert_eq!(screen.begin_submit().unwrap(), None);
        assert_eq!(screen.phase(), &Phase::Idle);
        assert_eq!(screen.errors()["Alamat"], "Alamat diperlukan");
        assert!(screen.can_submit());
    }

    #[test]
    fn test_request_keeps_schema_order_and_skips_empty_fields() {
        let mut screen = filled_screen();
        let request = screen.begin_submit().unwrap().unwrap();

        assert_eq!(screen.phase(), &Phase::Submitting);
        assert!(!screen.can_submit());
        assert_eq!(request.full_name, "Ahmad bin Abdullah");
        assert_eq!(request.membership_type, "biasa");
        assert_eq!(
            request.custom_fields,
            vec![
                ("Alamat".to_string(), "Ipoh".to_string()),
                ("Minat".to_string(), "Catur".to_string())
            ]
        );
    }

    #[test]
    fn test_second_submit_while_submitting_is_rejected() {
        let mut screen = filled_screen();
        screen.begin_submit().unwrap();
        assert!(matches!(screen.begin_submit(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_success_clears_form_and_register_another_resets() {
        let mut screen = filled_screen();
        screen.begin_submit().unwrap();
        screen.finish_submit(Ok(42));

        assert_eq!(screen.phase(), &Phase::Succeeded { member_id: 42 });
        assert_eq!(display_member_id(42), "#42");
        assert!(screen.controls().is_empty());
        assert_eq!(screen.values(), &SubmissionValues::cleared(&schema()));
        assert!(screen
            .edit(&[FieldEdit::Set {
                key: "email".into(),
                value: "x".into()
            }])
            .is_err());

        screen.register_another();
        assert_eq!(screen.phase(), &Phase::Idle);
        assert_eq!(screen.values(), &SubmissionValues::cleared(&schema()));
        assert!(screen.errors().is_empty());
        assert_eq!(screen.controls().len(), 7);
    }

    #[test]
    fn test_failure_keeps_values_for_retry() {
        let mut screen = filled_screen();
        let entered = screen.values().clone();
        screen.begin_submit().unwrap();
        screen.finish_submit(Err(AppError::Remote("Canister unavailable".into())));

        assert_eq!(
            screen.phase(),
            &Phase::Failed {
                message: "Canister unavailable".into()
            }
        );
        assert_eq!(screen.values(), &entered);
        assert!(screen.can_submit());

        // Retry straight from the failed state.
        assert!(screen.begin_submit().unwrap().is_some());
        screen.finish_submit(Err(AppError::Remote(String::new())));
        assert_eq!(
            screen.phase(),
            &Phase::Failed {
                message: RETRY_HINT.into()
            }
        );

        screen.dismiss_error();
        assert_eq!(screen.phase(), &Phase::Idle);
        assert_eq!(screen.values(), &entered);
    }

    #[test]
    fn test_rejected_batch_leaves_values_untouched() {
        let mut screen = filled_screen();
        let entered = screen.values().clone();

        let result = screen.edit(&[
            FieldEdit::Set {
                key: "Alamat".into(),
                value: "Kuantan".into(),
            },
            FieldEdit::Toggle {
                key: "Minat".into(),
                choice: "Golf".into(),
                checked: true,
            },
        ]);

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(screen.values(), &entered);
    }

    #[test]
    fn test_refresh_schema_adds_new_keys_only_when_idle() {
        let mut screen = filled_screen();
        let mut newer = schema();
        newer
            .fields
            .push(FieldDescriptor::new("Pekerjaan", FieldType::Text, false, vec![]).unwrap());

        screen.refresh_schema(newer.clone());
        assert_eq!(screen.schema(), &newer);
        assert_eq!(screen.values().get("Alamat"), "Ipoh");
        assert_eq!(screen.values().get("Pekerjaan"), "");

        screen.begin_submit().unwrap();
        screen.refresh_schema(schema());
        assert_eq!(screen.schema(), &newer);
    }
}
