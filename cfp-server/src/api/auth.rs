//! Session authentication and role gates
//!
//! `auth_middleware` resolves the bearer token into an [`Identity`] and
//! stores it in the request extensions. The role gates run after it and
//! only read that extension.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use cfp_common::access::require_role;
use cfp_common::db::sessions;
use cfp_common::{Identity, Role};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Token the current request authenticated with
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

fn bearer_token(request: &Request) -> Option<String> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Authentication middleware
///
/// Returns 401 when the header is missing or the token is unknown.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(token) = bearer_token(&request) else {
        return Err(ApiError::Unauthenticated);
    };

    let Some(identity) = sessions::find_session_identity(&state.db, &token).await? else {
        warn!("Rejected unknown session token on {}", request.uri().path());
        return Err(ApiError::Unauthenticated);
    };

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(SessionToken(token));

    Ok(next.run(request).await)
}

async fn gate(role: Role, request: Request, next: Next) -> ApiResult<Response> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or(ApiError::Unauthenticated)?;

    if let Err(e) = require_role(identity, role) {
        warn!(
            "User {} denied {} (requires {})",
            identity.id,
            request.uri().path(),
            role
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

/// Gate for `/admin/*`
pub async fn require_admin(request: Request, next: Next) -> ApiResult<Response> {
    gate(Role::Admin, request, next).await
}

/// Gate for `/reviewer/*`
pub async fn require_reviewer(request: Request, next: Next) -> ApiResult<Response> {
    gate(Role::Reviewer, request, next).await
}
