//! Member roster endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::auth::{require_admin, Caller};
use crate::roster::{build_roster, MemberRoster};
use crate::AppState;

/// GET /api/admin/members - Roster of all registered members.
pub async fn list_members(State(state): State<AppState>, caller: Caller) -> ApiResult<MemberRoster> {
    require_admin(state.collaborator.as_ref(), &caller).await?;

    let members = state.collaborator.get_all_members(&caller).await?;
    success(build_roster(members))
}
