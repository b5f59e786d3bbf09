use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    error::{AppError, AppResult},
    profiles::{self, Profile},
};

pub const USER_ID: &str = "user_id";
pub const PROFILE_CACHE: &str = "profile";

/// Identity of the signed-in user, or `Unauthorized` if the session has none.
pub async fn current_user(session: &Session) -> AppResult<String> {
    session
        .get::<String>(USER_ID)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Marks the session signed in and seeds the profile cache.
pub async fn sign_in(session: &Session, user_id: &str, profile: &Profile) -> AppResult<()> {
    session.insert(USER_ID, user_id).await?;
    cache_profile(session, profile).await
}

/// Drops identity and cached profile together.
pub async fn sign_out(session: &Session) -> AppResult<()> {
    session.clear().await;
    Ok(())
}

pub async fn cache_profile(session: &Session, profile: &Profile) -> AppResult<()> {
    session.insert(PROFILE_CACHE, profile).await?;
    Ok(())
}

/// Read-through profile lookup. The cached copy is a convenience only; on a
/// miss the store is consulted and its row overwrites the cache.
pub async fn current_profile(session: &Session, db_pool: &SqlitePool) -> AppResult<Profile> {
    if let Some(profile) = session.get::<Profile>(PROFILE_CACHE).await? {
        return Ok(profile);
    }

    let user_id = current_user(session).await?;
    let profile = profiles::fetch(db_pool, &user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    cache_profile(session, &profile).await?;
    Ok(profile)
}
