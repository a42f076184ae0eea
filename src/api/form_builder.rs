//! Form builder endpoints (administrators only).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::auth::{require_admin, Caller};
use crate::errors::AppError;
use crate::form::{render_preview, Control, Direction, FieldDraft, FormBuilder, SaveStatus};
use crate::models::FieldDescriptor;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderView {
    pub session_id: Uuid,
    pub fields: Vec<FieldDescriptor>,
    pub field_count: usize,
    pub save_status: SaveStatus,
    pub can_save: bool,
}

impl BuilderView {
    fn new(session_id: Uuid, builder: &FormBuilder) -> Self {
        Self {
            session_id,
            fields: builder.fields().to_vec(),
            field_count: builder.fields().len(),
            save_status: builder.save_status().clone(),
            can_save: *builder.save_status() != SaveStatus::Saving,
        }
    }
}

/// Result of an edit that may have been ignored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderEdit {
    pub applied: bool,
    #[serde(flatten)]
    pub builder: BuilderView,
}

#[derive(Debug, Deserialize)]
pub struct MoveFieldRequest {
    pub direction: Direction,
}

/// POST /api/admin/form-builder - Open a draft seeded from the current schema.
pub async fn open_form_builder(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<BuilderView> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;

    let current = state.collaborator.get_current_form(&caller).await?;
    let (id, builder) = state
        .builders
        .open(Some(principal.clone()), FormBuilder::seeded(current))
        .await;

    let builder = builder.lock().await;
    success(BuilderView::new(id, &builder))
}

/// GET /api/admin/form-builder/:id - Current draft.
pub async fn get_form_builder(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<BuilderView> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;
    let builder = state.builders.get(id, Some(principal)).await?;

    let builder = builder.lock().await;
    success(BuilderView::new(id, &builder))
}

/// GET /api/admin/form-builder/:id/preview - Disabled rendering of the draft.
pub async fn preview_form_builder(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Control>> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;
    let builder = state.builders.get(id, Some(principal)).await?;

    let draft = builder.lock().await.draft();
    success(render_preview(&draft))
}

/// POST /api/admin/form-builder/:id/fields - Append a field.
pub async fn append_field(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(draft): Json<FieldDraft>,
) -> ApiResult<BuilderEdit> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;
    let builder = state.builders.get(id, Some(principal)).await?;

    let mut builder = builder.lock().await;
    let applied = builder.append(&draft);
    if !applied {
        tracing::debug!("Ignored incomplete field '{}'", draft.field_label);
    }
    success(BuilderEdit {
        applied,
        builder: BuilderView::new(id, &builder),
    })
}

/// DELETE /api/admin/form-builder/:id/fields/:index - Remove a field.
pub async fn remove_field(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, index)): Path<(Uuid, usize)>,
) -> ApiResult<BuilderEdit> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;
    let builder = state.builders.get(id, Some(principal)).await?;

    let mut builder = builder.lock().await;
    let applied = builder.remove(index);
    success(BuilderEdit {
        applied,
        builder: BuilderView::new(id, &builder),
    })
}

/// POST /api/admin/form-builder/:id/fields/:index/move - Move a field one position.
pub async fn move_field(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<MoveFieldRequest>,
) -> ApiResult<BuilderEdit> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;
    let builder = state.builders.get(id, Some(principal)).await?;

    let mut builder = builder.lock().await;
    let applied = builder.move_field(index, request.direction);
    success(BuilderEdit {
        applied,
        builder: BuilderView::new(id, &builder),
    })
}

/// POST /api/admin/form-builder/:id/save - Replace the backend schema with the draft.
pub async fn save_form_builder(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<BuilderView> {
    let principal = require_admin(state.collaborator.as_ref(), &caller).await?;
    let builder = state.builders.get(id, Some(principal)).await?;

    let schema = builder.lock().await.begin_save()?;

    let collaborator = Arc::clone(&state.collaborator);
    let task_builder = Arc::clone(&builder);
    let principal = principal.clone();
    let outcome = tokio::spawn(async move {
        let result = collaborator.upload_form(&caller, &schema).await;

        match &result {
            Ok(()) => tracing::info!(
                "{} saved registration form with {} fields",
                principal,
                schema.len()
            ),
            Err(e) => tracing::warn!("Saving registration form failed: {}", e),
        }
        task_builder.lock().await.finish_save(result);
    })
    .await;

    let mut builder = builder.lock().await;
    if let Err(e) = outcome {
        tracing::error!("Save task ended abnormally: {}", e);
        builder.finish_save(Err(AppError::Internal(e.to_string())));
    }
    success(BuilderView::new(id, &builder))
}
