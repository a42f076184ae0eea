//! Session summary, profile setup and role endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::auth::{require_identity, Caller};
use crate::errors::AppError;
use crate::models::{Principal, UserProfile, UserRole};
use crate::AppState;

/// What the layout needs to know about the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    /// A signed-in caller without a stored profile is prompted for one
    pub show_profile_setup: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleView {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub principal: Principal,
    pub role: UserRole,
}

/// GET /api/session - Describe the caller.
pub async fn get_session(State(state): State<AppState>, caller: Caller) -> ApiResult<SessionView> {
    if !caller.is_authenticated() {
        return success(SessionView {
            authenticated: false,
            principal: None,
            is_admin: false,
            profile: None,
            show_profile_setup: false,
        });
    }

    let is_admin = state
        .collaborator
        .is_caller_admin(&caller)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Admin lookup failed: {}", e);
            false
        });

    let (profile, show_profile_setup) =
        match state.collaborator.get_caller_user_profile(&caller).await {
            Ok(Some(profile)) => (Some(profile), false),
            Ok(None) => (None, true),
            Err(e) => {
                tracing::warn!("Profile lookup failed: {}", e);
                (None, false)
            }
        };

    success(SessionView {
        authenticated: true,
        principal: caller.principal().cloned(),
        is_admin,
        profile,
        show_profile_setup,
    })
}

/// PUT /api/profile - Save the caller's profile.
pub async fn save_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<SaveProfileRequest>,
) -> ApiResult<UserProfile> {
    let principal = require_identity(&caller)?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Nama diperlukan".to_string()));
    }

    let profile = UserProfile {
        name: name.to_string(),
    };
    if let Err(e) = state
        .collaborator
        .save_caller_user_profile(&caller, &profile)
        .await
    {
        tracing::warn!("Saving profile for {} failed: {}", principal, e);
        return Err(AppError::Remote("Ralat menyimpan profil".to_string()));
    }

    tracing::info!("Profile saved for {}", principal);
    success(profile)
}

/// GET /api/profiles/:principal - Another user's profile (own profile or administrators).
pub async fn get_user_profile(
    State(state): State<AppState>,
    caller: Caller,
    Path(principal): Path<String>,
) -> ApiResult<Option<UserProfile>> {
    require_identity(&caller)?;

    let profile = state
        .collaborator
        .get_user_profile(&caller, &Principal::new(principal))
        .await?;
    success(profile)
}

/// GET /api/role - The caller's role.
pub async fn get_role(State(state): State<AppState>, caller: Caller) -> ApiResult<RoleView> {
    let role = state.collaborator.get_caller_user_role(&caller).await?;
    success(RoleView { role })
}

/// PUT /api/role - Assign a role to a principal.
pub async fn assign_role(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<AssignRoleRequest>,
) -> ApiResult<()> {
    let principal = require_identity(&caller)?;

    state
        .collaborator
        .assign_caller_user_role(&caller, &request.principal, request.role)
        .await?;

    tracing::info!(
        "{} assigned role {:?} to {}",
        principal,
        request.role,
        request.principal
    );
    success(())
}
