//! Speaker talk endpoints
//!
//! Speakers only ever see their own talks. Content changes require the
//! call for proposals to be open; reads do not.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use cfp_common::access::ensure_speaker_owns_talk;
use cfp_common::db::models::{Talk, TalkSubmission};
use cfp_common::db::talks;
use cfp_common::{Error, Identity};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// GET /talks
pub async fn list_own_talks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Talk>>> {
    Ok(Json(talks::find_talks_by_owner(&state.db, identity.id).await?))
}

/// POST /talks
pub async fn create_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(submission): Json<TalkSubmission>,
) -> ApiResult<(StatusCode, Json<Talk>)> {
    state.cfp.ensure_open()?;
    let submission = submission.sanitized()?;

    let talk = talks::create_talk(&state.db, identity.id, &submission).await?;
    info!("User {} submitted talk {}", identity.id, talk.id);

    Ok((StatusCode::CREATED, Json(talk)))
}

/// GET /talks/:id
pub async fn get_own_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
) -> ApiResult<Json<Talk>> {
    Ok(Json(ensure_speaker_owns_talk(&state.db, &identity, talk_id).await?))
}

/// PUT /talks/:id
pub async fn update_own_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
    Json(submission): Json<TalkSubmission>,
) -> ApiResult<Json<Talk>> {
    state.cfp.ensure_open()?;
    ensure_speaker_owns_talk(&state.db, &identity, talk_id).await?;
    let submission = submission.sanitized()?;

    if !talks::update_talk(&state.db, identity.id, talk_id, &submission).await? {
        return Err(Error::NotAuthorized.into());
    }

    let talk = ensure_speaker_owns_talk(&state.db, &identity, talk_id).await?;
    Ok(Json(talk))
}

/// DELETE /talks/:id
pub async fn delete_own_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.cfp.ensure_open()?;
    ensure_speaker_owns_talk(&state.db, &identity, talk_id).await?;

    if !talks::delete_talk(&state.db, identity.id, talk_id).await? {
        return Err(Error::NotAuthorized.into());
    }
    info!("User {} deleted talk {}", identity.id, talk_id);

    Ok(Json(json!({ "deleted": talk_id })))
}
