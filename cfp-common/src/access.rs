//! Talk access policy and role gating

use sqlx::SqlitePool;
use tracing::warn;

use crate::db::models::{Identity, Role, Talk};
use crate::db::talks;
use crate::{Error, Result};

/// Resolve one of the speaker's own talks.
///
/// The lookup goes through the owner relation, so a speaker can only ever
/// resolve their own talks. Not found and owned by someone else both map
/// to [`Error::NotAuthorized`] so callers can't probe for other talks.
pub async fn ensure_speaker_owns_talk(
    pool: &SqlitePool,
    identity: &Identity,
    talk_id: i64,
) -> Result<Talk> {
    let Some(talk) = talks::find_talk_for_owner(pool, identity.id, talk_id).await? else {
        return Err(Error::NotAuthorized);
    };

    ensure_owner(identity, &talk)?;

    Ok(talk)
}

/// Invariant check: the stored owner must be the acting identity
fn ensure_owner(identity: &Identity, talk: &Talk) -> Result<()> {
    if talk.user_id != identity.id {
        warn!(
            "Talk {} owned by {} resolved for user {}",
            talk.id, talk.user_id, identity.id
        );
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Fail unless the identity holds `role`
pub fn require_role(identity: &Identity, role: Role) -> Result<()> {
    if identity.has_role(role) {
        Ok(())
    } else {
        Err(Error::NotAuthorized)
    }
}
