//! Member registration form endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::auth::Caller;
use crate::errors::AppError;
use crate::form::{Control, FieldEdit, FieldErrors};
use crate::models::FormSchema;
use crate::registration::{display_member_id, Phase, RegistrationScreen};
use crate::AppState;

/// Confirmation shown after a successful registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub member_id: u64,
    pub display_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub can_submit: bool,
    pub controls: Vec<Control>,
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
    /// Dismissible message of the last failed submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_error: Option<String>,
}

impl RegistrationView {
    fn new(session_id: Uuid, screen: &RegistrationScreen) -> Self {
        let confirmation = match screen.phase() {
            Phase::Succeeded { member_id } => Some(Confirmation {
                member_id: *member_id,
                display_id: display_member_id(*member_id),
            }),
            _ => None,
        };
        let submit_error = match screen.phase() {
            Phase::Failed { message } => Some(message.clone()),
            _ => None,
        };

        Self {
            session_id,
            phase: screen.phase().clone(),
            can_submit: screen.can_submit(),
            controls: screen.controls(),
            errors: screen.errors().clone(),
            confirmation,
            submit_error,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditValuesRequest {
    pub edits: Vec<FieldEdit>,
}

async fn current_schema(state: &AppState, caller: &Caller) -> Option<FormSchema> {
    match state.collaborator.get_current_form(caller).await {
        Ok(schema) => Some(schema.unwrap_or_default()),
        Err(e) => {
            tracing::warn!("Could not load registration form schema: {}", e);
            None
        }
    }
}

/// POST /api/registrations - Open a registration form.
pub async fn open_registration(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<RegistrationView> {
    let schema = state
        .collaborator
        .get_current_form(&caller)
        .await?
        .unwrap_or_default();

    let (id, screen) = state
        .registrations
        .open(caller.principal().cloned(), RegistrationScreen::new(schema))
        .await;

    let screen = screen.lock().await;
    success(RegistrationView::new(id, &screen))
}

/// GET /api/registrations/:id - Current state of a registration form.
pub async fn get_registration(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<RegistrationView> {
    let screen = state.registrations.get(id, caller.principal()).await?;

    if let Some(schema) = current_schema(&state, &caller).await {
        screen.lock().await.refresh_schema(schema);
    }

    let screen = screen.lock().await;
    success(RegistrationView::new(id, &screen))
}

/// PATCH /api/registrations/:id/values - Apply control edits.
pub async fn edit_registration(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<EditValuesRequest>,
) -> ApiResult<RegistrationView> {
    let screen = state.registrations.get(id, caller.principal()).await?;
    let mut screen = screen.lock().await;

    screen.edit(&request.edits)?;
    success(RegistrationView::new(id, &screen))
}

/// POST /api/registrations/:id/submit - Validate and register.
pub async fn submit_registration(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<RegistrationView> {
    let screen = state.registrations.get(id, caller.principal()).await?;

    let request = screen.lock().await.begin_submit()?;

    if let Some(request) = request {
        // The call and its outcome run detached so a dropped request still
        // settles the screen.
        let collaborator = Arc::clone(&state.collaborator);
        let task_screen = Arc::clone(&screen);
        let outcome = tokio::spawn(async move {
            let result = collaborator.register_member(&caller, &request).await;

            match &result {
                Ok(member_id) => tracing::info!(
                    "Registered member {} ({} custom fields)",
                    member_id,
                    request.custom_fields.len()
                ),
                Err(e) => tracing::warn!("Registration failed: {}", e),
            }
            task_screen.lock().await.finish_submit(result);
        })
        .await;

        if let Err(e) = outcome {
            tracing::error!("Registration task ended abnormally: {}", e);
            screen
                .lock()
                .await
                .finish_submit(Err(AppError::Internal(e.to_string())));
        }
    }

    let screen = screen.lock().await;
    success(RegistrationView::new(id, &screen))
}

/// DELETE /api/registrations/:id/error - Dismiss the submission error.
pub async fn dismiss_registration_error(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<RegistrationView> {
    let screen = state.registrations.get(id, caller.principal()).await?;
    let mut screen = screen.lock().await;
    screen.dismiss_error();
    success(RegistrationView::new(id, &screen))
}

/// POST /api/registrations/:id/reset - Register another member.
pub async fn reset_registration(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<RegistrationView> {
    let screen = state.registrations.get(id, caller.principal()).await?;
    let mut screen = screen.lock().await;
    screen.register_another();
    success(RegistrationView::new(id, &screen))
}

/// DELETE /api/registrations/:id - Close a registration form.
pub async fn close_registration(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.registrations.close(id, caller.principal()).await?;
    success(())
}
