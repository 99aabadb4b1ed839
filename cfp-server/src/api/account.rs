//! Signup, login and logout

use axum::{extract::State, http::StatusCode, Extension, Json};
use cfp_common::db::models::User;
use cfp_common::db::users::{self, NewUser};
use cfp_common::db::sessions;
use cfp_common::Identity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::auth::SessionToken;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub identity: Identity,
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = users::create_user(&state.db, &new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let Some(identity) = users::authenticate(&state.db, &request.email, &request.password).await?
    else {
        warn!("Failed login for {}", request.email.trim());
        return Err(ApiError::Unauthenticated);
    };

    let token = sessions::create_session(&state.db, identity.id).await?;
    info!("User {} logged in", identity.id);

    Ok(Json(LoginResponse { token, identity }))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<Json<Value>> {
    sessions::delete_session(&state.db, &token).await?;
    info!("User {} logged out", identity.id);
    Ok(Json(json!({ "status": "ok" })))
}
