//! Speaker management
//!
//! Reviewers may list and view speakers. Role changes and deletion are
//! admin only, and an admin can never act on their own account here.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use cfp_common::db::models::Talk;
use cfp_common::db::talks;
use cfp_common::db::users::{self, UserPage, UserSearch, UserWithRoles};
use cfp_common::{Error, Identity, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SpeakerDetail {
    #[serde(flatten)]
    pub speaker: UserWithRoles,
    pub talks: Vec<Talk>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

async fn load_speaker(state: &AppState, user_id: i64) -> ApiResult<UserWithRoles> {
    let user = users::find_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))?;
    let roles = users::find_roles(&state.db, user_id).await?;
    Ok(UserWithRoles { user, roles })
}

fn ensure_not_self(identity: &Identity, user_id: i64, action: &str) -> ApiResult<()> {
    if identity.id == user_id {
        warn!("Admin {} attempted to {} their own account", identity.id, action);
        return Err(Error::NotAuthorized.into());
    }
    Ok(())
}

/// GET /{admin,reviewer}/speakers?search=&role=&page=&per_page=
///
/// `search` matches first name, last name, full name or email.
pub async fn list_speakers(
    State(state): State<AppState>,
    Query(query): Query<UserSearch>,
) -> ApiResult<Json<UserPage>> {
    Ok(Json(users::search_users(&state.db, &query).await?))
}

/// GET /{admin,reviewer}/speakers/:id
pub async fn view_speaker(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<SpeakerDetail>> {
    let speaker = load_speaker(&state, user_id).await?;
    let talks = talks::find_talks_by_owner(&state.db, user_id).await?;
    Ok(Json(SpeakerDetail { speaker, talks }))
}

/// POST /admin/speakers/:id/promote
pub async fn promote_speaker(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<UserWithRoles>> {
    let role: Role = request.role.parse()?;
    load_speaker(&state, user_id).await?;

    if !users::add_role(&state.db, user_id, role).await? {
        return Err(Error::Conflict(format!("User {} is already {}", user_id, role)).into());
    }
    info!("Admin {} promoted user {} to {}", identity.id, user_id, role);

    Ok(Json(load_speaker(&state, user_id).await?))
}

/// POST /admin/speakers/:id/demote
pub async fn demote_speaker(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<UserWithRoles>> {
    ensure_not_self(&identity, user_id, "demote")?;
    let role: Role = request.role.parse()?;
    load_speaker(&state, user_id).await?;

    if !users::remove_role(&state.db, user_id, role).await? {
        return Err(Error::Conflict(format!("User {} is not {}", user_id, role)).into());
    }
    info!("Admin {} removed {} from user {}", identity.id, role, user_id);

    Ok(Json(load_speaker(&state, user_id).await?))
}

/// DELETE /admin/speakers/:id
///
/// Talks, ratings, comments and sessions go with the account.
pub async fn delete_speaker(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    ensure_not_self(&identity, user_id, "delete")?;

    if !users::delete_user(&state.db, user_id).await? {
        return Err(Error::NotFound(format!("User {}", user_id)).into());
    }
    info!("Admin {} deleted user {}", identity.id, user_id);

    Ok(Json(json!({ "deleted": user_id })))
}
