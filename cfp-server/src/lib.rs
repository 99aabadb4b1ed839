//! cfp-server library - HTTP service for the call for papers
//!
//! Speakers submit talks while the call for proposals is open; admins and
//! reviewers rate, favorite, comment on and select them.

use axum::Router;
use cfp_common::{CallForProposals, RatingScheme};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Rating scheme applied by every rate request
    pub rating_scheme: RatingScheme,
    /// Submission window
    pub cfp: CallForProposals,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, rating_scheme: RatingScheme, cfp: CallForProposals) -> Self {
        Self {
            db,
            rating_scheme,
            cfp,
        }
    }
}

/// Build application router
///
/// `/health`, `/signup` and `/login` are open. Everything else needs a
/// session token; `/admin` and `/reviewer` additionally need the role.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let admin = Router::new()
        .route("/admin/talks", get(api::review::list_talks))
        .route("/admin/talks/:id", get(api::review::view_talk))
        .route("/admin/talks/:id/rate", post(api::review::rate_talk))
        .route("/admin/talks/:id/favorite", post(api::review::set_favorite))
        .route("/admin/talks/:id/select", post(api::review::set_selected))
        .route("/admin/talks/:id/comment", post(api::review::comment_on_talk))
        .route("/admin/speakers", get(api::speakers::list_speakers))
        .route(
            "/admin/speakers/:id",
            get(api::speakers::view_speaker).delete(api::speakers::delete_speaker),
        )
        .route("/admin/speakers/:id/promote", post(api::speakers::promote_speaker))
        .route("/admin/speakers/:id/demote", post(api::speakers::demote_speaker))
        .layer(middleware::from_fn(api::require_admin));

    let reviewer = Router::new()
        .route("/reviewer/talks", get(api::review::list_talks))
        .route("/reviewer/talks/:id", get(api::review::view_talk))
        .route("/reviewer/talks/:id/rate", post(api::review::rate_talk))
        .route("/reviewer/talks/:id/favorite", post(api::review::set_favorite))
        .route("/reviewer/talks/:id/comment", post(api::review::comment_on_talk))
        .route("/reviewer/speakers", get(api::speakers::list_speakers))
        .route("/reviewer/speakers/:id", get(api::speakers::view_speaker))
        .layer(middleware::from_fn(api::require_reviewer));

    // Any authenticated user
    let protected = Router::new()
        .route("/logout", post(api::account::logout))
        .route(
            "/talks",
            get(api::talks::list_own_talks).post(api::talks::create_talk),
        )
        .route(
            "/talks/:id",
            get(api::talks::get_own_talk)
                .put(api::talks::update_own_talk)
                .delete(api::talks::delete_own_talk),
        )
        .merge(admin)
        .merge(reviewer)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/signup", post(api::account::signup))
        .route("/login", post(api::account::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
