//! Administrator-side draft of the registration form schema.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{FieldDescriptor, FieldType, FormSchema};

/// A field as entered in the builder, before it is accepted into the draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    pub field_label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Choices typed one per line; used when `options` is absent
    #[serde(default)]
    pub options_text: Option<String>,
}

impl FieldDraft {
    fn choices(&self) -> Vec<String> {
        match (&self.options, &self.options_text) {
            (Some(options), _) => options
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            (None, Some(text)) => parse_choices(text),
            (None, None) => Vec::new(),
        }
    }
}

/// Split newline-separated choices, ignoring blank lines.
pub fn parse_choices(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Outcome of the most recent save of the draft.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Failed { message: String },
}

/// In-memory draft schema edited by an administrator and saved wholesale.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    fields: Vec<FieldDescriptor>,
    save_status: SaveStatus,
}

impl FormBuilder {
    /// Start a draft from the schema currently held by the backend.
    pub fn seeded(current: Option<FormSchema>) -> Self {
        Self {
            fields: current.map(|schema| schema.fields).unwrap_or_default(),
            save_status: SaveStatus::Idle,
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn draft(&self) -> FormSchema {
        FormSchema::new(self.fields.clone())
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    /// Append a field. Incomplete fields and duplicate labels are not added
    /// and `false` is returned.
    pub fn append(&mut self, draft: &FieldDraft) -> bool {
        let Some(field) = FieldDescriptor::new(
            &draft.field_label,
            draft.field_type,
            draft.required,
            draft.choices(),
        ) else {
            return false;
        };

        if self.fields.iter().any(|f| f.label == field.label) {
            return false;
        }

        self.fields.push(field);
        true
    }

    /// Remove the field at `index`. Out-of-range indexes change nothing.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.fields.len() {
            return false;
        }
        self.fields.remove(index);
        true
    }

    /// Swap the field at `index` with its neighbour. No-op at the boundaries.
    pub fn move_field(&mut self, index: usize, direction: Direction) -> bool {
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        match target {
            Some(target) if index < self.fields.len() && target < self.fields.len() => {
                self.fields.swap(index, target);
                true
            }
            _ => false,
        }
    }

    /// Mark a save as in flight and hand out the schema to upload.
    pub fn begin_save(&mut self) -> Result<FormSchema, AppError> {
        if self.save_status == SaveStatus::Saving {
            return Err(AppError::Conflict(
                "Borang sedang disimpan".to_string(),
            ));
        }
        self.save_status = SaveStatus::Saving;
        Ok(self.draft())
    }

    /// Record the outcome of an upload. The draft itself is never rolled back.
    pub fn finish_save(&mut self, result: Result<(), AppError>) {
        self.save_status = match result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Failed {
                message: e.message(),
            },
        };
    }
}
