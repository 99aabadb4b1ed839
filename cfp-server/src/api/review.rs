//! Talk review endpoints shared by `/admin` and `/reviewer`
//!
//! Rating, viewed state and listings are always scoped to the acting user.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use cfp_common::db::models::{RatingRecord, Talk, TalkComment, User};
use cfp_common::db::{comments, ratings, talks, users};
use cfp_common::talk_filter::{self, TalkListOptions, TalkPage};
use cfp_common::{Error, Identity, TalkRating};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// Query string for talk listings
#[derive(Debug, Default, Deserialize)]
pub struct ListTalksQuery {
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListTalksQuery {
    fn options(&self) -> TalkListOptions {
        TalkListOptions {
            order_by: self.order_by.clone(),
            sort: self.sort.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TalkListResponse {
    pub rating_system: &'static str,
    #[serde(flatten)]
    pub page: TalkPage,
}

#[derive(Debug, Serialize)]
pub struct TalkDetail {
    pub talk: Talk,
    pub speaker: Option<User>,
    pub comments: Vec<TalkComment>,
    pub rating: Option<i64>,
    pub rating_system: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub selected: bool,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub message: String,
}

async fn load_talk(state: &AppState, talk_id: i64) -> ApiResult<Talk> {
    talks::find_talk_by_id(&state.db, talk_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Talk {}", talk_id)).into())
}

/// GET /{admin,reviewer}/talks
pub async fn list_talks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListTalksQuery>,
) -> ApiResult<Json<TalkListResponse>> {
    let page = talk_filter::get_talks(
        &state.db,
        identity.id,
        query.filter.as_deref(),
        &query.options(),
    )
    .await?;

    Ok(Json(TalkListResponse {
        rating_system: state.rating_scheme.rating_name(),
        page,
    }))
}

/// GET /{admin,reviewer}/talks/:id
///
/// Opening a talk marks it viewed for the acting user.
pub async fn view_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
) -> ApiResult<Json<TalkDetail>> {
    let talk = load_talk(&state, talk_id).await?;
    let record = ratings::mark_viewed(&state.db, identity.id, talk_id, Utc::now()).await?;
    let speaker = users::find_user_by_id(&state.db, talk.user_id).await?;
    let comments = comments::find_comments_for_talk(&state.db, talk_id).await?;

    Ok(Json(TalkDetail {
        talk,
        speaker,
        comments,
        rating: record.rating,
        rating_system: state.rating_scheme.rating_name(),
    }))
}

/// POST /{admin,reviewer}/talks/:id/rate
pub async fn rate_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<RatingRecord>> {
    let rater = TalkRating::new(state.rating_scheme, identity.id, state.db.clone());
    Ok(Json(rater.rate(talk_id, request.rating).await?))
}

/// POST /{admin,reviewer}/talks/:id/favorite
///
/// Sets the favorite flag to the requested value; repeating a request is a no-op.
pub async fn set_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
    Json(request): Json<FavoriteRequest>,
) -> ApiResult<Json<Talk>> {
    if !talks::set_favorite(&state.db, talk_id, request.favorite).await? {
        return Err(Error::NotFound(format!("Talk {}", talk_id)).into());
    }
    info!(
        "User {} set favorite={} on talk {}",
        identity.id, request.favorite, talk_id
    );

    Ok(Json(load_talk(&state, talk_id).await?))
}

/// POST /admin/talks/:id/select
pub async fn set_selected(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<Talk>> {
    if !talks::set_selected(&state.db, talk_id, request.selected).await? {
        return Err(Error::NotFound(format!("Talk {}", talk_id)).into());
    }
    info!(
        "Admin {} set selected={} on talk {}",
        identity.id, request.selected, talk_id
    );

    Ok(Json(load_talk(&state, talk_id).await?))
}

/// POST /{admin,reviewer}/talks/:id/comment
pub async fn comment_on_talk(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(talk_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<Json<TalkComment>> {
    load_talk(&state, talk_id).await?;
    let comment = comments::add_comment(&state.db, talk_id, identity.id, &request.message).await?;
    Ok(Json(comment))
}
